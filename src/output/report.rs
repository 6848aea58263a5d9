use crate::render::escape_html;

const STYLESHEET: &str = r#"
    body { font-family: 'Inter', -apple-system, 'Segoe UI', sans-serif; margin: 0; background: #f8fafc; color: #0f172a; }
    main { max-width: 1200px; margin: 0 auto; padding: 32px; }
    header { background: #135bec; color: white; padding: 16px 32px; font-weight: 800; letter-spacing: -0.025em; }
    .race { background: white; border: 1px solid #e2e8f0; border-radius: 12px; padding: 20px; margin-bottom: 24px; }
    .race h2 { margin-top: 0; }
    .participants-table, .horses-table, .pedigree-table { width: 100%; border-collapse: collapse; margin-top: 12px; }
    .participants-table th, .participants-table td, .horses-table th, .horses-table td, .pedigree-table td, .pedigree-table th { border-bottom: 1px solid #e2e8f0; padding: 8px; text-align: left; }
    .participant-out td { text-decoration: line-through; }
    .horse-id { cursor: pointer; background: #f1f5f9; padding: 2px 6px; border-radius: 4px; }
    .history-new { color: #15803d; }
    .history-withdrawn { color: #b91c1c; }
    .history-changed { color: #b45309; }
    .history-other, .history-none { color: #64748b; }
    .error-message, .error { color: #b91c1c; background: #fef2f2; border: 1px solid #fecaca; border-radius: 8px; padding: 12px; }
    .info-message { color: #1e40af; background: #eff6ff; border: 1px solid #bfdbfe; border-radius: 8px; padding: 12px; }
    .success-message, .saved-summary { background: #f0fdf4; border: 1px solid #bbf7d0; border-radius: 8px; padding: 12px; margin-bottom: 24px; }
    .horse-details-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
    .ipa-text { font-style: italic; color: #475569; }
    .pedigree-section { margin-top: 24px; }
    .pedigree-generation th { background: #f1f5f9; }
    .bracket, .bracket ul { list-style: none; padding-left: 20px; border-left: 2px solid #cbd5e1; }
    .bracket .unknown > span { color: #94a3b8; }
    .toast { position: fixed; top: 20px; right: 20px; background: #28a745; color: white; padding: 10px 15px; border-radius: 5px; font-weight: bold; }
"#;

// click-to-copy for horse ids inside the page
const COPY_SCRIPT: &str = r#"
    document.addEventListener('click', function (ev) {
      var el = ev.target.closest('[data-copy]');
      if (!el) return;
      var text = el.getAttribute('data-copy');
      if (!text || text === 'N/A') return;
      navigator.clipboard.writeText(text).then(function () {
        var toast = document.createElement('div');
        toast.className = 'toast';
        toast.textContent = '✅ Horse ID copied: ' + text;
        document.body.appendChild(toast);
        setTimeout(function () { toast.remove(); }, 2000);
      });
    });
"#;

/// Wraps a fragment in a standalone page.
pub fn render_document(title: &str, body: &str) -> Vec<u8> {
    let title = escape_html(title);
    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title}</title>
  <style>{STYLESHEET}</style>
</head>
<body>
  <header>🏇 {title}</header>
  <main id="results">
{body}
  </main>
  <script>{COPY_SCRIPT}</script>
</body>
</html>
"####
    );
    html.into_bytes()
}
