use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::ops::Range;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::chart::{Frame, RenderedChart};
use crate::config::Config;
use crate::error::{GapminderError, Result};
use crate::reshape::WideTable;

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 20px; }
#chart { position: relative; display: inline-block; }
circle.bubble { stroke: #333333; stroke-opacity: 0.5; }
.slider { width: 700px; margin-top: 10px; }
.slider input { width: 100%; }
#tooltip {
  position: absolute; display: none; pointer-events: none;
  background: #ffffff; border: 1px solid #999999; padding: 4px 8px; font-size: 12px;
}
#tooltip .label { color: #666666; }
"#;

const SCRIPT: &str = r#"
(function () {
  var payload = JSON.parse(document.getElementById('frames').textContent);
  var slider = document.getElementById('year');
  var yearValue = document.getElementById('year-value');
  var container = document.getElementById('chart');
  var tooltip = document.getElementById('tooltip');
  var bubbles = Array.prototype.slice.call(document.querySelectorAll('circle.bubble'));
  var current = payload.frames[slider.value];

  function show(year) {
    var frame = payload.frames[year];
    if (!frame) { return; }
    current = frame;
    yearValue.textContent = year;
    bubbles.forEach(function (circle, i) {
      if (frame.cx[i] === null || frame.r[i] === null) {
        circle.setAttribute('visibility', 'hidden');
        return;
      }
      circle.setAttribute('cx', frame.cx[i]);
      circle.setAttribute('cy', frame.cy[i]);
      circle.setAttribute('r', frame.r[i]);
      circle.setAttribute('visibility', 'visible');
    });
  }

  function line(label, value) {
    var row = document.createElement('div');
    var name = document.createElement('span');
    name.className = 'label';
    name.textContent = label + ': ';
    row.appendChild(name);
    row.appendChild(document.createTextNode(value));
    return row;
  }

  bubbles.forEach(function (circle, i) {
    circle.addEventListener('mousemove', function (ev) {
      var pop = current ? current.pop[i] : null;
      tooltip.textContent = '';
      tooltip.appendChild(line('Country Name', payload.entities[i]));
      tooltip.appendChild(line('Population', pop === null ? '???' : pop.toLocaleString()));
      var box = container.getBoundingClientRect();
      tooltip.style.left = (ev.clientX - box.left + 12) + 'px';
      tooltip.style.top = (ev.clientY - box.top + 12) + 'px';
      tooltip.style.display = 'block';
    });
    circle.addEventListener('mouseleave', function () {
      tooltip.style.display = 'none';
    });
  });

  slider.addEventListener('input', function () { show(slider.value); });
})();
"#;

#[derive(Serialize)]
struct Payload<'a> {
    entities: &'a [String],
    frames: &'a BTreeMap<u16, Frame>,
}

// Keeps "</script>" inside a string from closing the element early.
fn embed_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn bubble_layer(frame: &Frame, colors: &[String], plot_area: &(Range<i32>, Range<i32>)) -> String {
    let (xs, ys) = plot_area;
    let mut layer = String::new();
    // bubbles near the axis edges are cut at the plotting area
    let _ = write!(
        layer,
        "<clipPath id=\"plot-area\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/></clipPath>",
        xs.start,
        ys.start,
        xs.end - xs.start,
        ys.end - ys.start
    );
    layer.push_str("<g id=\"bubbles\" clip-path=\"url(#plot-area)\">");
    for (row, color) in colors.iter().enumerate() {
        let cx = frame.cx.get(row).copied().flatten();
        let cy = frame.cy.get(row).copied().flatten();
        let r = frame.r.get(row).copied().flatten();
        let visibility = if cx.is_some() && r.is_some() {
            "visible"
        } else {
            "hidden"
        };
        let _ = write!(
            layer,
            "<circle class=\"bubble\" data-row=\"{}\" cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\" fill-opacity=\"0.8\" visibility=\"{}\"/>",
            row,
            cx.unwrap_or(0),
            cy.unwrap_or(0),
            r.unwrap_or(0.0),
            color,
            visibility
        );
    }
    layer.push_str("</g>");
    layer
}

/// Assembles the self-contained HTML page: chart, bubbles, slider and tooltip.
pub fn render_document(
    chart: &RenderedChart,
    table: &WideTable,
    colors: &[String],
    config: &Config,
) -> Result<String> {
    let initial = chart.frames.get(&config.snapshot_year).ok_or_else(|| {
        GapminderError::Config(format!(
            "no frame was rendered for snapshot year {}",
            config.snapshot_year
        ))
    })?;

    let close = chart
        .svg
        .rfind("</svg>")
        .ok_or_else(|| GapminderError::Draw("svg output has no closing tag".into()))?;
    let mut svg = String::with_capacity(chart.svg.len());
    svg.push_str(&chart.svg[..close]);
    svg.push_str(&bubble_layer(initial, colors, &chart.plot_area));
    svg.push_str(&chart.svg[close..]);

    let payload = serde_json::to_string(&Payload {
        entities: &table.entities,
        frames: &chart.frames,
    })?;

    let slider = &config.slider;
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Income vs life expectancy</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<div id=\"chart\">\n");
    html.push_str(&svg);
    html.push_str("\n<div id=\"tooltip\"></div>\n</div>\n");
    let _ = write!(
        html,
        "<div class=\"slider\"><label for=\"year\">Year: <span id=\"year-value\">{value}</span></label>\n\
         <input type=\"range\" id=\"year\" min=\"{start}\" max=\"{end}\" step=\"{step}\" value=\"{value}\"></div>\n",
        value = config.snapshot_year,
        start = slider.start,
        end = slider.end,
        step = slider.step,
    );
    html.push_str("<script type=\"application/json\" id=\"frames\">");
    html.push_str(&embed_json(&payload));
    html.push_str("</script>\n<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");

    Ok(html)
}

pub fn write_document(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)?;
    info!(path = %path.display(), bytes = html.len(), "wrote chart document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::JoinedTable;
    use crate::models::YearMatrix;
    use crate::reshape::reshape;
    use ndarray::array;

    fn table(name: &str) -> WideTable {
        reshape(JoinedTable {
            entities: vec![name.to_string(), "Chad".to_string()],
            groups: vec!["g".into(), "g".into()],
            gdp: YearMatrix {
                years: vec![2015],
                values: array![[1000.0], [900.0]],
            },
            lex: YearMatrix {
                years: vec![2015],
                values: array![[70.0], [50.0]],
            },
            pop: YearMatrix {
                years: vec![2015],
                values: array![[1e6], [2e6]],
            },
        })
    }

    fn chart() -> RenderedChart {
        let frame = Frame {
            cx: vec![Some(120), None],
            cy: vec![Some(300), None],
            r: vec![Some(0.85), None],
            pop: vec![Some(1e6), Some(2e6)],
        };
        RenderedChart {
            svg: "<svg width=\"700\" height=\"600\"><rect/></svg>\n".to_string(),
            frames: BTreeMap::from([(2015, frame)]),
            plot_area: (75..685, 15..535),
        }
    }

    fn colors() -> Vec<String> {
        vec!["#3288bd".to_string(), "#3288bd".to_string()]
    }

    #[test]
    fn document_carries_slider_and_bubbles() {
        let config = Config::default();
        let html = render_document(&chart(), &table("Sweden"), &colors(), &config).unwrap();

        assert!(html.contains("min=\"1800\" max=\"2015\" step=\"1\" value=\"2015\""));
        assert!(html.contains("cx=\"120\" cy=\"300\" r=\"0.85\" fill=\"#3288bd\""));
        assert!(html.contains("data-row=\"1\" cx=\"0\" cy=\"0\" r=\"0\""));
        assert!(html.contains("<rect x=\"75\" y=\"15\" width=\"610\" height=\"520\"/>"));
        let bubbles = html.find("<g id=\"bubbles\" clip-path=\"url(#plot-area)\">").unwrap();
        assert!(bubbles < html.find("</svg>").unwrap());
        assert!(html.contains("\"2015\":{\"cx\":[120,null]"));
        assert!(html.contains("line('Country Name', payload.entities[i])"));
        assert!(html.contains("line('Population',"));
        assert!(html.contains("<div id=\"tooltip\"></div>"));
    }

    #[test]
    fn entity_names_cannot_close_the_script() {
        let config = Config::default();
        let html = render_document(
            &chart(),
            &table("</script><b>"),
            &colors(),
            &config,
        )
        .unwrap();
        assert!(!html.contains("</script><b>"));
        assert!(html.contains("<\\/script><b>"));
    }

    #[test]
    fn missing_snapshot_frame_is_an_error() {
        let config = Config {
            snapshot_year: 1900,
            ..Config::default()
        };
        let err = render_document(&chart(), &table("Sweden"), &colors(), &config);
        assert!(matches!(err, Err(GapminderError::Config(_))));
    }

    #[test]
    fn writes_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("chart.html");
        write_document(&path, "<html></html>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
    }
}
