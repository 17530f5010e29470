use std::fs::File;
use std::io::{self, BufWriter, Write};

use camino::Utf8Path;
use serde::Serialize;

use crate::align::AlignedChart;
use crate::error::PandemiaError;

const ECHARTS_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";
const THEME_SCRIPT_BASE: &str = "https://cdn.jsdelivr.net/npm/echarts@5/theme";

pub const TITLE: &str = "Pandemia cu și fără Valuri";
pub const SUBTITLE: &str = "Decese zilnice la 1 milion de locuitori";

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
    pub subtext: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    pub show: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tooltip {
    pub show: bool,
    pub trigger: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataZoom {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub x_axis_index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkLineItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkLine {
    pub data: Vec<MarkLineItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub show: bool,
    pub formatter: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkPoint {
    pub label: Label,
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaStyle {
    pub opacity: f32,
}

/// Styling applied to every series of a chart.
#[derive(Debug, Clone)]
pub struct SeriesOptions {
    pub smooth: bool,
    pub mark_line: Option<MarkLine>,
    pub mark_point: Option<MarkPoint>,
    pub area_style: Option<AreaStyle>,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            smooth: false,
            mark_line: Some(MarkLine {
                data: vec![MarkLineItem {
                    name: "Average".to_string(),
                    kind: "average".to_string(),
                }],
            }),
            mark_point: Some(MarkPoint {
                label: Label {
                    show: true,
                    formatter: "{a}: {b}".to_string(),
                },
            }),
            area_style: Some(AreaStyle { opacity: 0.2 }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeries {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: Vec<f64>,
    pub smooth: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_line: Option<MarkLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_point: Option<MarkPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_style: Option<AreaStyle>,
}

/// The ECharts option object handed to `setOption` in the rendered page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOption {
    pub title: Title,
    pub legend: Legend,
    pub tooltip: Tooltip,
    pub data_zoom: Vec<DataZoom>,
    pub x_axis: Vec<Axis>,
    pub y_axis: Vec<Axis>,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone)]
pub struct LineChart {
    theme: String,
    page_title: String,
    option: ChartOption,
}

impl LineChart {
    pub fn new(title: &str, subtitle: &str) -> Self {
        Self {
            theme: "westeros".to_string(),
            page_title: title.to_string(),
            option: ChartOption {
                title: Title {
                    text: title.to_string(),
                    subtext: subtitle.to_string(),
                },
                legend: Legend { show: true },
                tooltip: Tooltip {
                    show: true,
                    trigger: "axis",
                },
                data_zoom: vec![DataZoom {
                    kind: "slider",
                    x_axis_index: 0,
                }],
                x_axis: vec![Axis {
                    kind: "category",
                    data: Some(Vec::new()),
                }],
                y_axis: vec![Axis {
                    kind: "value",
                    data: None,
                }],
                series: Vec::new(),
            },
        }
    }

    pub fn set_x_axis(&mut self, categories: Vec<String>) -> &mut Self {
        self.option.x_axis[0].data = Some(categories);
        self
    }

    pub fn add_series(&mut self, name: &str, values: Vec<f64>) -> &mut Self {
        self.option.series.push(LineSeries {
            name: name.to_string(),
            kind: "line",
            data: values,
            smooth: false,
            mark_line: None,
            mark_point: None,
            area_style: None,
        });
        self
    }

    pub fn set_series_options(&mut self, options: &SeriesOptions) -> &mut Self {
        for series in &mut self.option.series {
            series.smooth = options.smooth;
            series.mark_line = options.mark_line.clone();
            series.mark_point = options.mark_point.clone();
            series.area_style = options.area_style.clone();
        }
        self
    }

    pub fn option(&self) -> &ChartOption {
        &self.option
    }

    /// Writes a standalone HTML page that draws the chart with ECharts.
    pub fn render<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let option = serde_json::to_string(&self.option)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?
            .replace("</", "<\\/");
        let id = "pandemia_chart";

        writeln!(writer, "<!DOCTYPE html>")?;
        writeln!(writer, "<html>")?;
        writeln!(writer, "<head>")?;
        writeln!(writer, "    <meta charset=\"utf-8\">")?;
        writeln!(writer, "    <title>{}</title>", escape_html(&self.page_title))?;
        writeln!(writer, "    <script src=\"{ECHARTS_SCRIPT}\"></script>")?;
        writeln!(
            writer,
            "    <script src=\"{THEME_SCRIPT_BASE}/{}.js\"></script>",
            self.theme
        )?;
        writeln!(writer, "</head>")?;
        writeln!(writer, "<body>")?;
        writeln!(writer, "<div class=\"container\">")?;
        writeln!(
            writer,
            "    <div class=\"item\" id=\"{id}\" style=\"width:900px;height:500px;\"></div>"
        )?;
        writeln!(writer, "</div>")?;
        writeln!(writer, "<script type=\"text/javascript\">")?;
        writeln!(writer, "    \"use strict\";")?;
        writeln!(
            writer,
            "    let chart = echarts.init(document.getElementById('{id}'), \"{}\");",
            self.theme
        )?;
        writeln!(writer, "    let option = {option};")?;
        writeln!(writer, "    chart.setOption(option);")?;
        writeln!(writer, "</script>")?;
        writeln!(
            writer,
            "<style>.container {{margin-top:30px; display: flex; justify-content: center; align-items: center;}} .item {{margin: auto;}}</style>"
        )?;
        writeln!(writer, "</body>")?;
        writeln!(writer, "</html>")?;
        Ok(())
    }

    /// Renders into `path`, truncating any previous chart there.
    pub fn render_to_file(&self, path: &Utf8Path) -> Result<(), PandemiaError> {
        let render_err = |err: io::Error| PandemiaError::Render {
            path: path.to_string(),
            message: err.to_string(),
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
            std::fs::create_dir_all(parent.as_std_path()).map_err(render_err)?;
        }
        let file = File::create(path.as_std_path()).map_err(render_err)?;
        let mut writer = BufWriter::new(file);
        self.render(&mut writer).map_err(render_err)?;
        writer.flush().map_err(render_err)
    }
}

/// Builds the daily deaths per million chart from aligned series.
pub fn deaths_per_million_chart(aligned: &AlignedChart) -> LineChart {
    let mut chart = LineChart::new(TITLE, SUBTITLE);
    chart.set_x_axis(aligned.x_axis.clone());
    for series in &aligned.series {
        chart.add_series(&series.name, series.values.clone());
    }
    chart.set_series_options(&SeriesOptions::default());
    chart
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
