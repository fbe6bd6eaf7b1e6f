//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Render a score for learner-facing text: integral values keep one decimal
/// (`1.0`), everything else uses the shortest round-trip form (`0.5`,
/// `0.3333333333333333`).
pub fn format_score(score: f64) -> String {
  if score.is_finite() && score.fract() == 0.0 && score.abs() < 1e15 {
    format!("{:.1}", score)
  } else {
    format!("{}", score)
  }
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with authored HTML feedback or client payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) { cut -= 1; }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}
