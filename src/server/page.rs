//! Single-page dashboard. Figures arrive as JSON from `/api/view` and are drawn with plotly.js.

pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>COVID-19 tracker</title>
  <script src="https://cdn.plot.ly/plotly-2.35.2.min.js" charset="utf-8"></script>
  <style>
    body { font-family: "Nunito Sans", Arial, sans-serif; max-width: 1200px; margin: 24px auto; padding: 0 12px; color: #1a1a1a; }
    h1 { margin-bottom: 4px; text-transform: uppercase; letter-spacing: 2px; }
    .row { display: flex; gap: 16px; margin: 16px 0; }
    .card { border: 1px solid #ddd; border-radius: 6px; padding: 16px; flex: 1; }
    .card h4 { margin: 0 0 8px; font-weight: 400; text-transform: uppercase; font-size: 0.9rem; }
    .card h2 { margin: 0; }
    .selector { background: #1a1a1a; color: #fff; flex: 0 0 25%; }
    .selector label { display: block; margin: 8px 0 4px; }
    .selector select { width: 100%; padding: 6px; }
    .figure { flex: 1; min-height: 250px; }
    .side { flex: 0 0 25%; padding-top: 50px; }
    .error { color: #b00020; }
  </style>
</head>
<body>
  <h1>COVID-19 tracker</h1>
  <p>Tracks the development of COVID-19 and vaccination around the world.
     Data is collected from <a href="https://ourworldindata.org/coronavirus">Our World in Data</a>.</p>

  <div class="row" id="totals"></div>

  <div class="row card">
    <div class="card selector">
      <label for="variable">Select variable:</label>
      <select id="variable"></select>
      <br />
      <label for="metric">Select metric:</label>
      <select id="metric"></select>
    </div>
    <div id="map" class="figure"></div>
  </div>

  <div class="row card">
    <div id="current_week" class="side"></div>
    <div id="bar_plot" class="figure"></div>
  </div>

  <p id="status"></p>

  <script>
    const variableEl = document.getElementById('variable');
    const metricEl = document.getElementById('metric');
    const statusEl = document.getElementById('status');
    const plotConfig = { displayModeBar: false, responsive: true };

    async function getJson(path) {
      const response = await fetch(path);
      const payload = await response.json();
      if (!response.ok) throw new Error(payload.message || ('HTTP ' + response.status));
      return payload;
    }

    function showError(err) {
      statusEl.className = 'error';
      statusEl.textContent = err.message;
    }

    function fillSelect(el, options, value) {
      el.innerHTML = '';
      for (const option of options) {
        const opt = document.createElement('option');
        opt.value = option.value;
        opt.textContent = option.label;
        el.appendChild(opt);
      }
      el.value = value;
    }

    function drawMap(map) {
      const trace = {
        type: 'choropleth',
        locations: map.locations,
        z: map.z,
        hovertext: map.hover_names,
        hovertemplate: '<b>%{hovertext}</b><br>' + map.value_label + '=%{z}<extra></extra>',
        colorbar: { title: { text: '' } },
        showscale: map.show_scale,
      };
      const layout = {
        margin: map.margin,
        geo: { scope: map.scope, showframe: map.show_frame },
      };
      Plotly.react('map', [trace], layout, plotConfig);
    }

    function drawBar(bar) {
      const trace = {
        type: 'bar',
        x: bar.x,
        y: bar.y,
        hovertemplate: bar.x_label + '=%{x}<br>' + bar.y_label + '=%{y}<extra></extra>',
      };
      const layout = { margin: bar.margin, height: bar.height, xaxis: { title: null }, yaxis: { title: null } };
      Plotly.react('bar_plot', [trace], layout, plotConfig);
    }

    function drawCurrentWeek(week) {
      const el = document.getElementById('current_week');
      el.innerHTML = '';
      for (const [tag, text] of [['h2', week.display], ['h4', week.variable], ['h4', week.period]]) {
        const node = document.createElement(tag);
        node.textContent = text;
        el.appendChild(node);
      }
    }

    async function refresh(includeMetric) {
      let path = '/api/view?variable=' + encodeURIComponent(variableEl.value);
      if (includeMetric && metricEl.value) path += '&metric=' + encodeURIComponent(metricEl.value);
      const view = await getJson(path);
      fillSelect(metricEl, view.metric_options.options, view.selection.metric);
      drawMap(view.map);
      drawBar(view.bar);
      drawCurrentWeek(view.current_week);
      statusEl.textContent = '';
    }

    async function init() {
      const totals = await getJson('/api/totals');
      const row = document.getElementById('totals');
      for (const card of totals.cards) {
        const div = document.createElement('div');
        div.className = 'card';
        const label = document.createElement('h4');
        label.textContent = card.label;
        const value = document.createElement('h2');
        value.textContent = card.display;
        div.append(label, value);
        row.appendChild(div);
      }

      const variables = await getJson('/api/variables');
      fillSelect(variableEl, variables.options, variables.value);
      await refresh(false);
    }

    variableEl.addEventListener('change', () => refresh(false).catch(showError));
    metricEl.addEventListener('change', () => refresh(true).catch(showError));
    init().catch(showError);
  </script>
</body>
</html>
"#;
