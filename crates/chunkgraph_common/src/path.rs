use std::path::Path;

use sugar_path::SugarPath;

fn looks_like_absolute_path(segment: &str) -> bool {
  let bytes = segment.as_bytes();
  segment.starts_with('/')
    || (bytes.len() > 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'\\')
}

/// Rewrites every absolute path inside `identifier` relative to `context`.
///
/// Identifiers may chain several requests (`loader!/abs/file.js`, `a|b`), so the identifier is
/// split on `|`, `!` and spaces and each piece is handled on its own.
pub fn make_paths_relative(context: &Path, identifier: &str) -> String {
  let mut output = String::with_capacity(identifier.len());
  let mut segment_start = 0;
  let push_segment = |output: &mut String, segment: &str| {
    if looks_like_absolute_path(segment) {
      let relative = Path::new(segment).relative(context);
      output.push_str(&relative.to_string_lossy().replace('\\', "/"));
    } else {
      output.push_str(segment);
    }
  };
  for (idx, ch) in identifier.char_indices() {
    if matches!(ch, '|' | '!' | ' ') {
      push_segment(&mut output, &identifier[segment_start..idx]);
      output.push(ch);
      segment_start = idx + ch.len_utf8();
    }
  }
  push_segment(&mut output, &identifier[segment_start..]);
  output
}
