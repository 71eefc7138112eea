//! Filename sanitization utilities

/// Characters that are unsafe in file names on at least one major OS
const FORBIDDEN: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Sanitize a filename for safe filesystem usage
///
/// Each forbidden character becomes an underscore, then runs of underscores
/// collapse into one. Applying it twice gives the same result as once.
///
/// # Examples
///
/// ```
/// use ymexport::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("AC/DC-Back In Black.mp3"), "AC_DC-Back In Black.mp3");
/// assert_eq!(sanitize_filename("What?: Live.mp3"), "What_ Live.mp3");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if FORBIDDEN.contains(&c) { '_' } else { c };
        if c == '_' && result.ends_with('_') {
            continue;
        }
        result.push(c);
    }
    result
}
