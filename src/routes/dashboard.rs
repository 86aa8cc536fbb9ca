use axum::{
    http::header,
    response::{Html, IntoResponse},
};

pub async fn dashboard() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "public, max-age=60")],
        Html(DASHBOARD_HTML),
    )
}

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Weather Station Dashboard</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
    <style>
        :root {
            --bg: #0f172a;
            --surface: #1e293b;
            --border: #334155;
            --text: #f3f4f6;
            --muted: #94a3b8;
            --accent: #3b82f6;
            --live: #34d399;
            --custom: #fbbf24;
            --error: #f87171;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body { font-family: system-ui, -apple-system, sans-serif; background: var(--bg); color: var(--text); min-height: 100vh; }

        .header {
            padding: 1rem 1.5rem;
            font-size: 1.25rem;
            font-weight: 600;
            border-bottom: 1px solid var(--border);
        }
        .mode { font-size: 0.9rem; margin-left: 1rem; font-weight: 400; }
        .mode.live { color: var(--live); }
        .mode.custom { color: var(--custom); }

        .dashboard-grid {
            display: grid;
            grid-template-columns: repeat(auto-fill, minmax(340px, 1fr));
            gap: 1rem;
            padding: 1.5rem;
        }
        .card {
            background: var(--surface);
            border: 1px solid var(--border);
            border-radius: 0.5rem;
            padding: 1rem;
        }
        .card-header { font-size: 0.875rem; color: var(--muted); margin-bottom: 0.75rem; }

        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 0.5rem; text-align: left; }
        tbody tr { border-top: 1px solid var(--border); }

        .thermometer { display: flex; flex-direction: column; align-items: center; }
        .thermometer-bar {
            width: 24px; height: 160px;
            border: 2px solid var(--border);
            border-radius: 12px;
            display: flex; align-items: flex-end;
            overflow: hidden;
        }
        .thermometer-fill { width: 100%; background: var(--error); }
        .thermometer-value { margin-top: 8px; font-size: 1.5rem; }

        .time-range-btn {
            padding: 0.5rem 1rem;
            margin: 0 0.25rem 0.25rem 0;
            border: 1px solid var(--border);
            border-radius: 0.375rem;
            background: var(--bg);
            color: var(--text);
            cursor: pointer;
        }
        .time-range-btn.selected { background: var(--accent); border-color: var(--accent); }
        .time-range-btn.live-btn { background: var(--live); color: #000; }
        .custom-picker { display: none; margin-top: 1rem; }
        .custom-picker.open { display: block; }
        .custom-picker label { display: block; margin: 0.5rem 0 0.25rem; color: var(--muted); font-size: 0.875rem; }
        .custom-picker input {
            width: 100%; padding: 0.5rem;
            background: var(--bg); color: var(--text);
            border: 1px solid var(--border); border-radius: 4px;
        }

        .error-panel { padding: 2rem; text-align: center; color: var(--error); }
        .error-panel p { margin: 1rem 0; color: var(--text); }
        .hidden { display: none; }
    </style>
</head>
<body>
    <div class="header">Weather Station Dashboard <span id="mode" class="mode"></span></div>

    <div id="error" class="error-panel hidden">
        <h2>Error Loading Data</h2>
        <p id="error-message"></p>
        <button class="time-range-btn" onclick="refreshNow()">Retry</button>
        <button id="error-back-live" class="time-range-btn live-btn" onclick="backToLive()">Back to Live</button>
    </div>

    <div id="grid" class="dashboard-grid">
        <div class="card">
            <div class="card-header">Latest Conditions</div>
            <div id="latest-conditions"></div>
        </div>
        <div class="card">
            <div class="card-header">Thermometer</div>
            <div id="thermometer"></div>
        </div>
        <div class="card">
            <div class="card-header">Wind Rose</div>
            <canvas id="windrose"></canvas>
        </div>
        <div class="card">
            <div class="card-header">Time Range</div>
            <div id="time-range-selector"></div>
            <div id="custom-picker" class="custom-picker">
                <label for="start-datetime">Start Date &amp; Time</label>
                <input type="datetime-local" id="start-datetime">
                <label for="end-datetime">End Date &amp; Time</label>
                <input type="datetime-local" id="end-datetime">
                <button class="time-range-btn" style="margin-top: 1rem" onclick="applyCustom()">Apply</button>
            </div>
        </div>
        <div id="series-cards" style="display: contents"></div>
    </div>

<script>
const charts = {};
let dashboard = null;
let ranges = null;
let pollTimer = null;

const api = url => fetch(url).then(async r => {
    const body = await r.json();
    if (!r.ok) throw new Error(body.error || r.statusText);
    return body;
});
const post = (url, payload) => fetch(url, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: payload ? JSON.stringify(payload) : undefined,
}).then(async r => {
    const body = await r.json();
    if (!r.ok) throw new Error(body.error || r.statusText);
    return body;
});

function renderMode() {
    const el = document.getElementById('mode');
    const live = dashboard.selection.mode === 'live';
    el.className = 'mode ' + (live ? 'live' : 'custom');
    el.textContent = live
        ? `LIVE (auto-refresh: ${Math.round(dashboard.poll_interval_seconds / 60)} min)`
        : 'Custom Time Range';
}

// Browser-local rendering of the latest instant; raw text if it did not parse
const localTime = latest => latest.time ? new Date(latest.time).toLocaleString() : latest.timestamp;

function renderLatest() {
    const root = document.getElementById('latest-conditions');
    if (!dashboard.latest) { root.textContent = 'No data available.'; return; }
    root.innerHTML = `<table>
        <thead><tr><th>Variable</th><th>Value</th><th>Unit</th><th>Timestamp (local)</th></tr></thead>
        <tbody>${dashboard.latest.rows.map(r =>
            `<tr><td>${r.label}</td><td>${r.display}</td><td>${r.unit}</td><td>${localTime(dashboard.latest)}</td></tr>`
        ).join('')}</tbody></table>`;
}

function renderThermometer() {
    const root = document.getElementById('thermometer');
    const t = dashboard.thermometer;
    if (!t) { root.textContent = 'No data'; return; }
    root.innerHTML = `<div class="thermometer">
        <div class="thermometer-bar"><div class="thermometer-fill" style="height:${t.fill * 100}%"></div></div>
        <div class="thermometer-value">${t.display ?? '--'}</div></div>`;
}

function renderChart(id, config) {
    if (charts[id]) charts[id].destroy();
    charts[id] = new Chart(document.getElementById(id), config);
}

function renderWindRose() {
    const rose = dashboard.wind_rose;
    renderChart('windrose', {
        type: 'polarArea',
        data: { labels: rose.labels, datasets: [{ label: 'Wind Speed (m/s)', data: rose.bins, backgroundColor: rose.colors }] },
        options: { plugins: { legend: { display: true } }, scales: { r: { beginAtZero: true } } },
    });
}

function renderSeries(series) {
    const container = document.getElementById('series-cards');
    if (!container.childElementCount) {
        container.innerHTML = series.map(s =>
            `<div class="card"><div class="card-header">${s.label}</div><canvas id="chart-${s.key}"></canvas></div>`
        ).join('');
    }
    for (const s of series) {
        renderChart(`chart-${s.key}`, {
            type: 'line',
            data: { labels: s.labels, datasets: [{
                label: s.label, data: s.values,
                borderColor: s.color, backgroundColor: s.color + '33',
                pointRadius: 0, fill: true, tension: 0.2,
            }] },
            options: {
                plugins: { legend: { display: false } },
                scales: { x: { display: false }, y: { beginAtZero: false, title: { display: true, text: s.label } } },
            },
        });
    }
}

function renderRangeSelector() {
    const root = document.getElementById('time-range-selector');
    const sel = dashboard.selection;
    const live = sel.mode === 'live';
    root.innerHTML = ranges.presets.map(p =>
        `<button class="time-range-btn${live && sel.hours === p.hours ? ' selected' : ''}" onclick="selectLive(${p.hours})">${p.label}</button>`
    ).join('')
        + `<button class="time-range-btn${live ? '' : ' selected'}" onclick="openCustom()">Custom</button>`
        + (live ? '' : '<button class="time-range-btn live-btn" onclick="backToLive()">Back to Live</button>');
}

function toLocalInput(date) {
    const pad = n => String(n).padStart(2, '0');
    return `${date.getFullYear()}-${pad(date.getMonth() + 1)}-${pad(date.getDate())}T${pad(date.getHours())}:${pad(date.getMinutes())}`;
}

function openCustom() {
    const now = new Date();
    const start = document.getElementById('start-datetime');
    const end = document.getElementById('end-datetime');
    if (!start.value) start.value = toLocalInput(new Date(now.getTime() - 24 * 3600 * 1000));
    if (!end.value) end.value = toLocalInput(now);
    document.getElementById('custom-picker').classList.add('open');
}

async function render() {
    renderMode();
    const failed = Boolean(dashboard.error);
    document.getElementById('error').classList.toggle('hidden', !failed);
    document.getElementById('grid').classList.toggle('hidden', failed);
    if (failed) {
        document.getElementById('error-message').textContent = dashboard.error;
        return;
    }
    renderLatest();
    renderThermometer();
    renderWindRose();
    renderRangeSelector();
    renderSeries(await api('/api/series'));
}

async function apply(promise) {
    try {
        dashboard = await promise;
    } catch (e) {
        dashboard = await api('/api/dashboard');
        if (!dashboard.error) dashboard.error = e.message;
    }
    await render();
}

const selectLive = hours => apply(post('/api/range', { hours }));
const backToLive = () => apply(post('/api/range/live'));
const refreshNow = () => apply(post('/api/refresh'));
function applyCustom() {
    const start = new Date(document.getElementById('start-datetime').value);
    const end = new Date(document.getElementById('end-datetime').value);
    apply(post('/api/range/custom', { start: start.toISOString(), end: end.toISOString() }));
}

async function init() {
    ranges = await api('/api/ranges');
    await apply(api('/api/dashboard'));
    // The server polls upstream; the page only re-reads the snapshot
    pollTimer = setInterval(() => apply(api('/api/dashboard')), 60 * 1000);
}

init();
</script>
</body>
</html>
"##;
