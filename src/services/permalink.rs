//! Source permalinks for violation locations.

use crate::parsers::manifest::relative_to;

/// Build `<host>/<owner>/<repo>/blob/<ref>/<relative-path>#L<line>`.
pub fn source_permalink(
    server_url: &str,
    repository: &str,
    git_ref: &str,
    workspace: &str,
    file: &str,
    line: u32,
) -> String {
    format!(
        "{}/{}/blob/{}/{}#L{}",
        server_url.trim_end_matches('/'),
        repository.trim_matches('/'),
        git_ref,
        relative_to(file, workspace),
        line
    )
}
