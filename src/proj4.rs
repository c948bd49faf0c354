/// Rewrites a proj4 string as MapServer `PROJECTION` parameters: one quoted
/// parameter per line, leading `+` removed, each line prefixed by `indent`.
pub fn format_proj4(proj4: &str, indent: &str) -> String {
    proj4
        .split_whitespace()
        .map(|param| param.strip_prefix('+').unwrap_or(param))
        .filter(|param| !param.is_empty())
        .map(|param| format!("{}'{}'\n", indent, param))
        .collect()
}
