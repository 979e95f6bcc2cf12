use anyhow::anyhow;
use chrono::{DateTime, Local};
use log::info;
use rouille::{Request, Response};
use std::{
    fmt::Write,
    str::FromStr,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    client::{ChartSource, cache::ChartCache},
    config::HttpConfig,
    domain::{category::ChartCategory, normalize::normalize_table, record::ChartTable},
    http::error::ApiError,
    present::{
        error::ViewError,
        escape_html,
        table::{self, SortKey, TableOptions},
    },
    visualize::{ChartVisualizationKind, compute_visualization, text::render_text},
};

/// Dashboard over the upstream charts, sharing one fetch cache between requests.
pub struct HttpServer<S> {
    source: S,
    cache: Mutex<ChartCache>,
    /// one fetch in flight per category, indexed by [`ChartCategory::index`]
    fetching: [Mutex<()>; ChartCategory::ALL.len()],
    pub config: HttpConfig,
}

// a panic while holding a lock leaves the guarded data intact
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: ChartSource + Send + Sync + 'static> HttpServer<S> {
    pub fn new(source: S, config: HttpConfig) -> Self {
        Self {
            source,
            cache: Mutex::new(ChartCache::new()),
            fetching: std::array::from_fn(|_| Mutex::new(())),
            config,
        }
    }

    /// Blocks serving requests until the process exits.
    pub fn run(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        let server = rouille::Server::new(&addr, move |request| self.handle_request(request))
            .map_err(|e| anyhow!("failed to bind {addr}: {e}"))?;
        server.run();
        Ok(())
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let response = rouille::router!(request,
            (GET) (/) => {
                self.handle_page(request)
            },
            (GET) (/api/charts/{category: String}) => {
                Self::respond(self.api_chart(&category, request))
            },
            (GET) (/api/charts/{category: String}/visualization/{kind: String}) => {
                Self::respond(self.api_visualization(&category, &kind))
            },
            _ => Response::empty_404()
        );

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.raw_url());
    }

    fn respond(result: Result<Response, ApiError>) -> Response {
        match result {
            Ok(r) => r,
            Err(e) => e.into_response(),
        }
    }

    /// One fetch-then-normalize pass for `category`.
    fn load_table(
        &self,
        category: ChartCategory,
        refresh: bool,
    ) -> Result<(ChartTable, DateTime<Local>), ViewError> {
        let _fetching = lock(&self.fetching[category.index()]);
        {
            let mut cache = lock(&self.cache);
            if refresh {
                cache.invalidate(category);
            }
            if let Some(cached) = cache.get(category) {
                return Ok((normalize_table(category, &cached.items), cached.fetched_at));
            }
        }

        // the shared cache stays available to other categories during the fetch
        let items = self.source.fetch(category)?;
        let mut cache = lock(&self.cache);
        let cached = cache.store(category, items);
        Ok((normalize_table(category, &cached.items), cached.fetched_at))
    }

    fn api_chart(&self, category: &str, request: &Request) -> Result<Response, ApiError> {
        let category: ChartCategory = parse_param(category)?;
        let refresh = request.get_param("refresh").is_some();

        let (table, _) = self.load_table(category, refresh)?;
        Ok(Response::json(&table.records))
    }

    fn api_visualization(&self, category: &str, kind: &str) -> Result<Response, ApiError> {
        let category: ChartCategory = parse_param(category)?;
        let kind: ChartVisualizationKind = parse_param(kind)?;
        if category != ChartCategory::Track {
            return Err(ViewError::UnsupportedCategory(category).into());
        }

        let (table, _) = self.load_table(category, false)?;
        let spec = compute_visualization(kind, &table).map_err(ViewError::from)?;
        Ok(Response::json(&spec))
    }

    fn handle_page(&self, request: &Request) -> Response {
        Self::respond(self.page(request))
    }

    fn page(&self, request: &Request) -> Result<Response, ApiError> {
        let category = match request.get_param("category") {
            Some(category) => parse_param(&category)?,
            None => ChartCategory::Track,
        };
        let kind = match request.get_param("chart") {
            Some(kind) => parse_param(&kind)?,
            None => ChartVisualizationKind::DurationHistogram,
        };
        let sort = request
            .get_param("sort")
            .filter(|column| !column.is_empty())
            .map(|column| SortKey {
                column,
                descending: request.get_param("desc").as_deref() == Some("1"),
            });
        let refresh = request.get_param("refresh").is_some();

        let options = TableOptions {
            sort,
            query_suffix: format!("&chart={kind}"),
        };
        let (content, chart) = self.render_sections(category, kind, &options, refresh);

        Ok(Response::html(fill_template(
            include_str!("../../html/dashboard.html"),
            &[
                ("CATEGORY_OPTIONS", &category_options(category)),
                ("CHART_CONTROLS", &chart_controls(category, kind)),
                ("CONTENT", &content),
                ("CHART", &chart),
            ],
        )))
    }

    /// Table and chart areas of the page. Fetch failures and empty charts
    /// leave the chart area blank.
    fn render_sections(
        &self,
        category: ChartCategory,
        kind: ChartVisualizationKind,
        options: &TableOptions,
        refresh: bool,
    ) -> (String, String) {
        let (table, fetched_at) = match self.load_table(category, refresh) {
            Ok(loaded) => loaded,
            Err(err) => return (message("error", &err), String::new()),
        };

        let table_html = match table::render_html(&table, options) {
            Ok(html) => html,
            Err(err) => return (message("warning", &err), String::new()),
        };
        let content = format!(
            "<h2>Top {}</h2>\n{table_html}<small>Datos obtenidos: {}</small>\n",
            category.label(),
            fetched_at.format("%Y-%m-%d %H:%M:%S"),
        );

        let chart = match category {
            ChartCategory::Track => match compute_visualization(kind, &table) {
                Ok(spec) => format!(
                    "<h3>{}</h3>\n<pre>{}</pre>\n",
                    kind.title(),
                    escape_html(&render_text(&spec))
                ),
                Err(err) => message("warning", &ViewError::from(err)),
            },
            ChartCategory::Album
            | ChartCategory::Artist
            | ChartCategory::Playlist
            | ChartCategory::Podcast => String::new(),
        };

        (content, chart)
    }
}

/// Substitutes every `{{NAME}}` of `template` in a single pass, so text
/// coming from the inserted values is never treated as a placeholder.
/// Unknown placeholders are kept as they are.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let Some(end) = tail.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &tail[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(name);
                out.push_str("}}");
            }
        }
        rest = &tail[end + 2..];
    }
    out.push_str(rest);
    out
}

fn parse_param<T>(value: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| ApiError::BadRequest(e.to_string()))
}

fn message(class: &str, err: &ViewError) -> String {
    format!(
        "<div class=\"{class}\">{}</div>\n",
        escape_html(&err.to_string())
    )
}

fn category_options(selected: ChartCategory) -> String {
    let mut out = String::new();
    for category in ChartCategory::ALL {
        let _ = write!(
            out,
            "<option value=\"{category}\"{}>{}</option>",
            if category == selected { " selected" } else { "" },
            category.label()
        );
    }
    out
}

fn chart_controls(category: ChartCategory, selected: ChartVisualizationKind) -> String {
    if category != ChartCategory::Track {
        return String::new();
    }
    let mut out = String::from(
        "<h4>Gráficos interactivos</h4>\n<label>Selecciona un gráfico<br>\n<select name=\"chart\" onchange=\"this.form.submit()\">",
    );
    for kind in ChartVisualizationKind::ALL {
        let _ = write!(
            out,
            "<option value=\"{kind}\"{}>{}</option>",
            if kind == selected { " selected" } else { "" },
            kind.label()
        );
    }
    out.push_str("</select></label>");
    out
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
