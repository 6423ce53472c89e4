use chrono::{DateTime, Utc};
use std::borrow::Cow;

use super::templates::{PageTemplates, TemplateStore, ERROR};
use crate::error::Result;
use crate::providers::DashboardPipeline;

/// Replaces `{field}` tokens with the value of the matching field.
///
/// Runs in a single pass: inserted values are never scanned again, and tokens
/// without a matching field are left as they are.
pub fn substitute(template: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let matched = after.find('}').and_then(|close| {
            let key = &after[..close];
            fields
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (close, *value))
        });

        match matched {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

pub fn html_escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Values shared by the whole page.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub project: &'a str,
    pub updated: DateTime<Utc>,
    /// When false, upstream values are inserted verbatim.
    pub escape_html: bool,
}

impl PageContext<'_> {
    fn value<'v>(&self, text: &'v str) -> Cow<'v, str> {
        if self.escape_html {
            html_escape(text)
        } else {
            Cow::Borrowed(text)
        }
    }
}

/// Assembles the dashboard: one row per pipeline, one cell per stage.
///
/// `{td}` and `{table}` receive already rendered fragments and are never
/// escaped.
pub fn render_page(
    templates: &PageTemplates,
    pipelines: &[DashboardPipeline],
    context: &PageContext<'_>,
) -> String {
    let table: String = pipelines
        .iter()
        .map(|pipeline| render_row(templates, pipeline, context))
        .collect();

    let project = context.value(context.project);
    let updated = context.updated.format("%Y-%m-%d %H:%M:%S UTC").to_string();

    substitute(
        &templates.main,
        &[
            ("table", table.as_str()),
            ("project", project.as_ref()),
            ("updated", updated.as_str()),
        ],
    )
}

fn render_row(
    templates: &PageTemplates,
    pipeline: &DashboardPipeline,
    context: &PageContext<'_>,
) -> String {
    let cells: String = pipeline
        .stages
        .iter()
        .map(|(name, status)| {
            let name = context.value(name);
            substitute(
                &templates.cell,
                &[("name", name.as_ref()), ("status", status.name())],
            )
        })
        .collect();

    let id = pipeline.id.to_string();
    let status = context.value(&pipeline.status);
    let ref_ = context.value(&pipeline.ref_);
    let url = context.value(&pipeline.web_url);

    substitute(
        &templates.row,
        &[
            ("id", id.as_str()),
            ("status", status.as_ref()),
            ("ref", ref_.as_ref()),
            ("url", url.as_ref()),
            ("td", cells.as_str()),
        ],
    )
}

/// Renders dashboards from templates read at render time.
#[derive(Debug, Clone)]
pub struct DashboardRenderer {
    templates: TemplateStore,
    project: String,
    escape_html: bool,
}

impl DashboardRenderer {
    pub fn new(templates: TemplateStore, project: String, escape_html: bool) -> Self {
        Self {
            templates,
            project,
            escape_html,
        }
    }

    pub async fn render(&self, pipelines: &[DashboardPipeline]) -> Result<String> {
        let templates = self.templates.load_page().await?;
        let context = PageContext {
            project: &self.project,
            updated: Utc::now(),
            escape_html: self.escape_html,
        };
        Ok(render_page(&templates, pipelines, &context))
    }

    pub async fn error_page(&self) -> Result<String> {
        self.templates.load(ERROR).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;
    use chrono::TimeZone;
    use indexmap::IndexMap;

    fn templates() -> PageTemplates {
        PageTemplates {
            main: "<h1>{project}</h1><table>{table}</table><p>{updated}</p>".to_string(),
            row: "<tr class=\"{status}\"><td>{id}</td><td>{ref}</td>{td}</tr>".to_string(),
            cell: "<td class=\"{status}\">{name}</td>".to_string(),
        }
    }

    fn context(escape_html: bool) -> PageContext<'static> {
        PageContext {
            project: "group/project",
            updated: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            escape_html,
        }
    }

    fn pipeline(id: u64, ref_: &str, stages: &[(&str, Status)]) -> DashboardPipeline {
        DashboardPipeline {
            id,
            ref_: ref_.to_string(),
            status: "failed".to_string(),
            web_url: String::new(),
            stages: stages
                .iter()
                .map(|(name, status)| (name.to_string(), *status))
                .collect::<IndexMap<_, _>>(),
        }
    }

    mod substitute {
        use super::*;

        #[test]
        fn replaces_known_field() {
            assert_eq!(substitute("<b>{name}</b>", &[("name", "main")]), "<b>main</b>");
        }

        #[test]
        fn replaces_every_occurrence() {
            assert_eq!(substitute("{a}-{a}", &[("a", "x")]), "x-x");
        }

        #[test]
        fn leaves_unknown_tokens() {
            assert_eq!(
                substitute("<b>{name}</b>{other}", &[("name", "main")]),
                "<b>main</b>{other}"
            );
        }

        #[test]
        fn leaves_braces_that_are_not_tokens() {
            let css = "body { margin: 0; } {name} {unclosed";
            assert_eq!(
                substitute(css, &[("name", "x")]),
                "body { margin: 0; } x {unclosed"
            );
        }

        #[test]
        fn handles_doubled_braces() {
            assert_eq!(substitute("{{name}}", &[("name", "main")]), "{main}");
        }

        #[test]
        fn inserted_values_are_not_rescanned() {
            assert_eq!(
                substitute("{ref}|{td}", &[("ref", "{td}"), ("td", "cells")]),
                "{td}|cells"
            );
        }
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            html_escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
        assert!(matches!(html_escape("feature/login"), Cow::Borrowed(_)));
    }

    #[test]
    fn renders_rows_and_cells_in_order() {
        let pipelines = [
            pipeline(7, "main", &[("build", Status::Success), ("test", Status::Failed)]),
            pipeline(6, "dev", &[]),
        ];

        let html = render_page(&templates(), &pipelines, &context(true));

        assert_eq!(
            html,
            "<h1>group/project</h1><table>\
             <tr class=\"failed\"><td>7</td><td>main</td>\
             <td class=\"success\">build</td><td class=\"failed\">test</td></tr>\
             <tr class=\"failed\"><td>6</td><td>dev</td></tr>\
             </table><p>2024-05-01 12:30:00 UTC</p>"
        );
    }

    #[test]
    fn empty_dashboard_has_empty_table() {
        let html = render_page(&templates(), &[], &context(true));
        assert!(html.contains("<table></table>"));
    }

    #[test]
    fn escapes_upstream_values_by_default() {
        let pipelines = [pipeline(1, "<script>", &[("a&b", Status::Running)])];

        let html = render_page(&templates(), &pipelines, &context(true));

        assert!(html.contains("<td>&lt;script&gt;</td>"));
        assert!(html.contains(">a&amp;b</td>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn verbatim_mode_inserts_values_unescaped() {
        let pipelines = [pipeline(1, "<i>main</i>", &[])];

        let html = render_page(&templates(), &pipelines, &context(false));

        assert!(html.contains("<td><i>main</i></td>"));
    }
}
