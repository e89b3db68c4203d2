pub mod config;
pub mod fit;
pub mod info;
pub mod process;
pub mod reduce;
pub mod run;

/// Parse `t0,t1` seconds into a fit window.
pub fn parse_window(s: &str) -> Result<(f64, f64), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("window '{s}' needs two values: t0,t1"))?;
    let t0: f64 = a.trim().parse().map_err(|e| format!("invalid t0 '{a}': {e}"))?;
    let t1: f64 = b.trim().parse().map_err(|e| format!("invalid t1 '{b}': {e}"))?;
    if t1 <= t0 {
        return Err(format!("window '{s}' is empty"));
    }
    Ok((t0, t1))
}
