mod render;
mod styling;
mod templates;

pub use render::{html_escape, render_page, substitute, DashboardRenderer, PageContext};
use styling::{cyan, dim, magenta_bold};
pub use templates::{PageTemplates, TemplateStore};

/// Prints the `cidash` banner to stderr.
///
/// Displays the tool name, version, and the address the dashboard is served on.
pub fn print_banner(addr: &str) {
    eprintln!(
        r"
{} {}
  {} {}
",
        magenta_bold("📊 cidash"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitLab CI dashboard on"),
        cyan(format!("http://{addr}/"))
    );
}
