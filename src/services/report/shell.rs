//! Static HTML shell for the offline report.
//!
//! The shell embeds the serialized payload in a JSON script tag and renders
//! only the summary view eagerly; every other tab is built on first
//! activation by the inline script, from the embedded payload. Media carry
//! `data-defer-src` and resolve to real sources only as they approach the
//! viewport.

use crate::error::{AppError, AppResult};
use crate::services::ansi::html_escape;

use super::payload::ReportPayload;

/// Render the complete self-contained document.
///
/// The only external reference at view time is the CDN-hosted charting
/// library; everything else (data, styles, script, media) is inline.
pub fn render(payload: &ReportPayload) -> AppResult<String> {
    let json = serde_json::to_string(payload)
        .map_err(|e| AppError::Storage(format!("Failed to serialize report payload: {}", e)))?
        // Keep "</script>" (or any tag) inside the JSON from terminating the
        // data block early.
        .replace('<', "\\u003c");

    let title = format!(
        "Test Run Report - {}",
        payload.run.timestamp.format("%Y-%m-%d %H:%M UTC")
    );

    let mut html = String::with_capacity(json.len() + 24 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>");
    html.push_str(&html_escape(&title));
    html.push_str("</title>\n");
    html.push_str("<script src=\"https://cdn.jsdelivr.net/npm/chart.js@4\"></script>\n");
    html.push_str("<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str("<header>\n<h1>");
    html.push_str(&html_escape(&title));
    html.push_str("</h1>\n<p class=\"meta\">run ");
    html.push_str(&html_escape(&payload.run.id.to_string()));
    html.push_str(" · generated ");
    html.push_str(&html_escape(
        &payload.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    ));
    html.push_str("</p>\n</header>\n");

    html.push_str(
        "<nav class=\"tabs\">\n\
         <button class=\"tab active\" data-tab=\"summary\">Summary</button>\n\
         <button class=\"tab\" data-tab=\"tests\">Tests</button>\n\
         <button class=\"tab\" data-tab=\"failures\">Failures</button>\n\
         <button class=\"tab\" data-tab=\"trends\">Trends</button>\n\
         <button class=\"tab\" data-tab=\"workers\">Workers</button>\n\
         </nav>\n",
    );

    html.push_str("<main>\n<section id=\"tab-summary\" class=\"tab-panel active\">\n");
    html.push_str(&render_summary(payload));
    html.push_str("</section>\n");
    for tab in ["tests", "failures", "trends", "workers"] {
        html.push_str("<section id=\"tab-");
        html.push_str(tab);
        html.push_str("\" class=\"tab-panel\"></section>\n");
    }
    html.push_str("</main>\n");

    html.push_str("<script id=\"pulse-data\" type=\"application/json\">");
    html.push_str(&json);
    html.push_str("</script>\n<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");

    Ok(html)
}

/// Server-rendered summary: the one view that must not wait for script.
fn render_summary(payload: &ReportPayload) -> String {
    let run = &payload.run;
    let mut out = String::new();

    out.push_str("<div class=\"tiles\">\n");
    for (label, value, class) in [
        ("Total", run.total_tests.to_string(), "neutral"),
        ("Passed", run.passed.to_string(), "passed"),
        ("Failed", run.failed.to_string(), "failed"),
        ("Timed out", run.timed_out.to_string(), "failed"),
        ("Skipped", run.skipped.to_string(), "skipped"),
        ("Pending", run.pending.to_string(), "skipped"),
        ("Duration", format_duration(run.duration), "neutral"),
        ("Flaky (history)", payload.flaky_tests.len().to_string(), "flaky"),
    ] {
        out.push_str("<div class=\"tile tile-");
        out.push_str(class);
        out.push_str("\"><span class=\"tile-value\">");
        out.push_str(&html_escape(&value));
        out.push_str("</span><span class=\"tile-label\">");
        out.push_str(label);
        out.push_str("</span></div>\n");
    }
    out.push_str("</div>\n");

    out.push_str("<h2>Suites</h2>\n");
    if payload.suites.is_empty() {
        out.push_str("<p class=\"placeholder\">No tests in this run.</p>\n");
    } else {
        out.push_str(
            "<table class=\"suites\">\n<thead><tr>\
             <th>Suite</th><th>Total</th><th>Passed</th><th>Failed</th>\
             <th>Skipped</th><th>Duration</th></tr></thead>\n<tbody>\n",
        );
        for suite in &payload.suites {
            out.push_str("<tr><td>");
            out.push_str(&html_escape(&suite.name));
            out.push_str("</td><td>");
            out.push_str(&suite.total.to_string());
            out.push_str("</td><td>");
            out.push_str(&suite.passed.to_string());
            out.push_str("</td><td>");
            out.push_str(&suite.failed.to_string());
            out.push_str("</td><td>");
            out.push_str(&suite.skipped.to_string());
            out.push_str("</td><td>");
            out.push_str(&html_escape(&format_duration(suite.duration)));
            out.push_str("</td></tr>\n");
        }
        out.push_str("</tbody>\n</table>\n");
    }

    if payload.trend.is_empty() {
        out.push_str(
            "<p class=\"placeholder\">No trend data available yet; history builds up \
             as more runs are archived.</p>\n",
        );
    }

    out.push_str("<h2>Environment</h2>\n");
    if payload.run.environment.is_null() {
        out.push_str("<p class=\"placeholder\">No environment data.</p>\n");
    } else {
        out.push_str(&environment_html(&payload.run.environment));
    }

    out
}

/// Recursive formatter for the free-form environment value.
fn environment_html(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => "<span class=\"env-empty\">(none)</span>".to_string(),
        Value::Bool(b) => format!("<span>{}</span>", b),
        Value::Number(n) => format!("<span>{}</span>", n),
        Value::String(s) => format!("<span>{}</span>", html_escape(s)),
        Value::Array(items) => {
            let mut out = String::from("<ul class=\"env-list\">");
            for item in items {
                out.push_str("<li>");
                out.push_str(&environment_html(item));
                out.push_str("</li>");
            }
            out.push_str("</ul>");
            out
        }
        Value::Object(map) => {
            let mut out = String::from("<dl class=\"env\">");
            for (key, item) in map {
                out.push_str("<dt>");
                out.push_str(&html_escape(key));
                out.push_str("</dt><dd>");
                out.push_str(&environment_html(item));
                out.push_str("</dd>");
            }
            out.push_str("</dl>");
            out
        }
    }
}

/// Human-readable duration from milliseconds.
fn format_duration(ms: i64) -> String {
    if ms >= 60_000 {
        format!("{:.1} min", ms as f64 / 60_000.0)
    } else if ms >= 1_000 {
        format!("{:.1} s", ms as f64 / 1_000.0)
    } else {
        format!("{} ms", ms)
    }
}

const STYLE: &str = r#"
:root { color-scheme: light; }
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, -apple-system, sans-serif; color: #1c2733; background: #f4f6f8; }
header { padding: 20px 28px 8px; }
header h1 { margin: 0 0 4px; font-size: 22px; }
header .meta { margin: 0; color: #5c6b7a; font-size: 13px; }
.tabs { display: flex; gap: 4px; padding: 12px 28px 0; border-bottom: 1px solid #d8dee5; }
.tab { border: none; background: none; padding: 8px 14px; font-size: 14px; cursor: pointer; border-bottom: 2px solid transparent; color: #5c6b7a; }
.tab.active { color: #1c2733; border-bottom-color: #2866c4; font-weight: 600; }
.tab-panel { display: none; padding: 20px 28px; }
.tab-panel.active { display: block; }
.tiles { display: flex; flex-wrap: wrap; gap: 12px; margin-bottom: 20px; }
.tile { background: #fff; border: 1px solid #d8dee5; border-radius: 8px; padding: 12px 18px; min-width: 110px; display: flex; flex-direction: column; }
.tile-value { font-size: 22px; font-weight: 700; }
.tile-label { font-size: 12px; color: #5c6b7a; }
.tile-passed .tile-value { color: #2e7d32; }
.tile-failed .tile-value { color: #c62828; }
.tile-skipped .tile-value { color: #8a6d1a; }
.tile-flaky .tile-value { color: #b26a00; }
table.suites { border-collapse: collapse; background: #fff; width: 100%; }
table.suites th, table.suites td { text-align: left; padding: 8px 12px; border-bottom: 1px solid #e3e8ee; font-size: 14px; }
.placeholder { color: #5c6b7a; font-style: italic; }
.env { margin: 0; background: #fff; border: 1px solid #d8dee5; border-radius: 8px; padding: 10px 14px; }
.env dt { font-weight: 600; margin-top: 6px; }
.env dd { margin: 0 0 0 14px; }
.env-list { margin: 0; padding-left: 18px; }
.suite { margin-bottom: 18px; }
.suite-name { margin: 10px 0 6px; font-size: 16px; }
details { background: #fff; border: 1px solid #e3e8ee; border-radius: 6px; margin: 4px 0; padding: 6px 10px; }
summary { cursor: pointer; display: flex; gap: 10px; align-items: baseline; }
.badge { font-size: 11px; padding: 2px 8px; border-radius: 10px; text-transform: uppercase; letter-spacing: 0.04em; }
.badge-passed { background: #e3f2e5; color: #2e7d32; }
.badge-failed, .badge-timedOut { background: #fbe4e4; color: #c62828; }
.badge-skipped, .badge-pending { background: #f5ecd4; color: #8a6d1a; }
.test-name { font-size: 14px; }
.test-meta { font-size: 12px; color: #5c6b7a; margin-left: auto; }
pre.error-output, pre.stdout-output { background: #10151b; color: #e5e5e5; padding: 10px 12px; border-radius: 6px; overflow-x: auto; font-size: 12px; }
ul.steps { list-style: none; padding-left: 16px; }
.step { padding: 2px 0; font-size: 13px; }
.step-meta { color: #5c6b7a; font-size: 12px; margin-left: 8px; }
.step-error { color: #c62828; font-size: 12px; }
.media { display: flex; flex-wrap: wrap; gap: 10px; margin-top: 8px; }
.media img, .media video { max-width: 320px; border: 1px solid #d8dee5; border-radius: 6px; }
.attachment-link { font-size: 13px; }
.flaky-row { display: flex; gap: 12px; padding: 6px 0; border-bottom: 1px solid #e3e8ee; font-size: 14px; }
.flaky-meta { color: #5c6b7a; }
.lane { display: flex; align-items: center; gap: 10px; margin: 6px 0; }
.lane-label { width: 90px; font-size: 13px; color: #5c6b7a; }
.track { position: relative; flex: 1; height: 18px; background: #e9edf1; border-radius: 4px; }
.bar { position: absolute; top: 2px; bottom: 2px; border-radius: 3px; background: #2e7d32; }
.bar-failed, .bar-timedOut { background: #c62828; }
.bar-skipped, .bar-pending { background: #caa53d; }
.note { font-size: 13px; color: #5c6b7a; }
"#;

const SCRIPT: &str = r#"
(function () {
  'use strict';

  var payload = JSON.parse(document.getElementById('pulse-data').textContent);
  var renderedTabs = {};
  var byId = {};
  payload.results.forEach(function (t) { byId[t.id] = t; });

  // Media elements resolve to real sources only as they approach the
  // viewport; until then the bytes sit untouched in the payload.
  var observer = new IntersectionObserver(function (entries) {
    entries.forEach(function (entry) {
      if (!entry.isIntersecting) { return; }
      var node = entry.target;
      var value = node.getAttribute('data-defer-src');
      if (value !== null) {
        if (node.tagName === 'A') { node.href = value; } else { node.src = value; }
        node.removeAttribute('data-defer-src');
      }
      observer.unobserve(node);
    });
  }, { rootMargin: '200px' });

  function observeMedia(root) {
    root.querySelectorAll('[data-defer-src]').forEach(function (node) { observer.observe(node); });
  }

  function el(tag, className, text) {
    var node = document.createElement(tag);
    if (className) { node.className = className; }
    if (text !== undefined) { node.textContent = text; }
    return node;
  }

  function fmtMs(ms) {
    if (ms >= 60000) { return (ms / 60000).toFixed(1) + ' min'; }
    if (ms >= 1000) { return (ms / 1000).toFixed(1) + ' s'; }
    return ms + ' ms';
  }

  function statusBadge(status) { return el('span', 'badge badge-' + status, status); }

  function downloadLink(att) {
    var link = el('a', 'attachment-link', att.name);
    link.setAttribute('data-defer-src', att.dataUri);
    link.setAttribute('download', att.name);
    return link;
  }

  function mediaBlock(test) {
    var wrap = el('div', 'media');
    test.screenshots.forEach(function (shot) {
      var img = el('img', 'screenshot');
      img.alt = shot.name;
      img.setAttribute('data-defer-src', shot.dataUri);
      wrap.appendChild(img);
    });
    test.videos.forEach(function (video) {
      var player = el('video');
      player.controls = true;
      player.setAttribute('data-defer-src', video.dataUri);
      wrap.appendChild(player);
    });
    if (test.trace) { wrap.appendChild(downloadLink(test.trace)); }
    test.attachments.forEach(function (att) { wrap.appendChild(downloadLink(att)); });
    return wrap;
  }

  function stepTree(steps) {
    var list = el('ul', 'steps');
    steps.forEach(function (step) {
      var item = el('li', 'step step-' + step.status);
      item.appendChild(el('span', 'step-title', (step.isHook ? '[hook] ' : '') + step.title));
      item.appendChild(el('span', 'step-meta', fmtMs(step.duration) + (step.codeLocation ? ' · ' + step.codeLocation : '')));
      if (step.errorMessage) { item.appendChild(el('div', 'step-error', step.errorMessage)); }
      if (step.steps.length) { item.appendChild(stepTree(step.steps)); }
      list.appendChild(item);
    });
    return list;
  }

  function testDetails(test) {
    var details = el('details');
    var summary = el('summary');
    summary.appendChild(statusBadge(test.status));
    summary.appendChild(el('span', 'test-name', test.name));
    var meta = fmtMs(test.duration) + ' · ' + test.browser +
      (test.workerId >= 0 ? ' · worker ' + test.workerId : ' · no worker slot') +
      (test.retries ? ' · ' + test.retries + ' retries' : '');
    summary.appendChild(el('span', 'test-meta', meta));
    details.appendChild(summary);
    if (test.errorHtml) {
      var err = el('pre', 'error-output');
      // Converter output: escaped text inside generated spans only.
      err.innerHTML = test.errorHtml;
      details.appendChild(err);
    }
    if (test.stdoutHtml.length) {
      var out = el('pre', 'stdout-output');
      out.innerHTML = test.stdoutHtml.join('\n');
      details.appendChild(out);
    }
    if (test.steps.length) { details.appendChild(stepTree(test.steps)); }
    details.appendChild(mediaBlock(test));
    return details;
  }

  var renderers = {
    tests: function (panel) {
      if (!payload.suites.length) {
        panel.appendChild(el('p', 'placeholder', 'No tests in this run.'));
        return;
      }
      payload.suites.forEach(function (suite) {
        var section = el('section', 'suite');
        section.appendChild(el('h3', 'suite-name',
          suite.name + ' - ' + suite.passed + '/' + suite.total + ' passed'));
        suite.testIds.forEach(function (id) {
          var test = byId[id];
          if (test) { section.appendChild(testDetails(test)); }
        });
        panel.appendChild(section);
      });
    },
    failures: function (panel) {
      var failures = payload.results.filter(function (t) {
        return t.status === 'failed' || t.status === 'timedOut';
      });
      if (!failures.length) {
        panel.appendChild(el('p', 'placeholder', 'No failures in this run.'));
      }
      failures.forEach(function (test) { panel.appendChild(testDetails(test)); });

      panel.appendChild(el('h3', null, 'Flaky tests across archived runs'));
      if (!payload.flakyTests.length) {
        panel.appendChild(el('p', 'placeholder', 'No flaky tests detected.'));
        return;
      }
      payload.flakyTests.forEach(function (flaky) {
        var row = el('div', 'flaky-row');
        row.appendChild(el('span', 'flaky-name', flaky.name));
        row.appendChild(el('span', 'flaky-meta',
          flaky.failedCount + ' failed / ' + flaky.totalRuns + ' runs · suite ' + flaky.suiteName));
        panel.appendChild(row);
      });
    },
    trends: function (panel) {
      if (!payload.trend.length) {
        panel.appendChild(el('p', 'placeholder', 'No trend data available yet.'));
        return;
      }
      var canvas = el('canvas');
      panel.appendChild(canvas);
      if (typeof Chart === 'undefined') {
        panel.appendChild(el('p', 'placeholder',
          'Charting library unavailable; raw trend data remains embedded in this document.'));
        return;
      }
      new Chart(canvas, {
        type: 'line',
        data: {
          labels: payload.trend.map(function (p) { return p.date.slice(0, 10); }),
          datasets: [
            { label: 'Passed', data: payload.trend.map(function (p) { return p.passed; }), borderColor: '#2e7d32' },
            { label: 'Failed', data: payload.trend.map(function (p) { return p.failed; }), borderColor: '#c62828' },
            { label: 'Skipped', data: payload.trend.map(function (p) { return p.skipped; }), borderColor: '#caa53d' },
            { label: 'Flakiness', data: payload.trend.map(function (p) { return p.flakinessRate; }), borderColor: '#b26a00', yAxisID: 'rate' }
          ]
        },
        options: { scales: { rate: { position: 'right', min: 0, max: 1 } } }
      });
    },
    workers: function (panel) {
      var workers = payload.workers;
      if (!workers.lanes.length) {
        panel.appendChild(el('p', 'placeholder', 'No worker activity recorded.'));
      }
      var min = Infinity;
      var max = -Infinity;
      workers.lanes.forEach(function (lane) {
        lane.spans.forEach(function (span) {
          min = Math.min(min, Date.parse(span.startTime));
          max = Math.max(max, Date.parse(span.endTime));
        });
      });
      var range = Math.max(max - min, 1);
      workers.lanes.forEach(function (lane) {
        var row = el('div', 'lane');
        row.appendChild(el('span', 'lane-label', 'worker ' + lane.workerId));
        var track = el('div', 'track');
        lane.spans.forEach(function (span) {
          var start = Date.parse(span.startTime);
          var end = Date.parse(span.endTime);
          var bar = el('div', 'bar bar-' + span.status);
          bar.style.left = ((start - min) / range * 100) + '%';
          bar.style.width = Math.max((end - start) / range * 100, 0.5) + '%';
          bar.title = span.name + ' (' + span.status + ')';
          track.appendChild(bar);
        });
        row.appendChild(track);
        panel.appendChild(row);
      });
      panel.appendChild(el('p', 'note',
        workers.note + ' Excluded tests here: ' + workers.unassigned.length + '.'));
    }
  };

  document.querySelectorAll('.tab').forEach(function (button) {
    button.addEventListener('click', function () {
      var name = button.getAttribute('data-tab');
      document.querySelectorAll('.tab').forEach(function (other) {
        other.classList.toggle('active', other === button);
      });
      document.querySelectorAll('.tab-panel').forEach(function (panel) {
        panel.classList.toggle('active', panel.id === 'tab-' + name);
      });
      var panel = document.getElementById('tab-' + name);
      if (renderers[name] && !renderedTabs[name]) {
        renderers[name](panel);
        renderedTabs[name] = true;
        observeMedia(panel);
      }
    });
  });
})();
"#;
