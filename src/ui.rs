use crate::models::{Business, CycleType, Profile};
use crate::render::escape_html;
use std::fmt::Write;

/// Everything the dashboard page needs for its first paint: the default
/// tab's pre-rendered fragments plus the persisted profile/business
/// state.
pub struct IndexContext<'a> {
    pub default_cycle: CycleType,
    pub ring_html: String,
    pub summary_html: String,
    pub cards_html: String,
    pub initial_periods_json: String,
    pub businesses: &'a [Business],
    pub profile: &'a Profile,
}

pub fn render_index(ctx: &IndexContext) -> String {
    INDEX_HTML
        .replace("{{DEFAULT_CYCLE}}", ctx.default_cycle.as_str())
        .replace("{{TABS}}", &render_tabs(ctx.default_cycle))
        .replace("{{RING}}", &ctx.ring_html)
        .replace("{{SUMMARY}}", &ctx.summary_html)
        .replace("{{PANELS}}", &render_panels(ctx))
        .replace("{{BUSINESS_ROWS}}", &render_business_rows(ctx.businesses))
        .replace("{{DOB}}", &date_value(&ctx.profile.date_of_birth))
        .replace("{{BIZ_DATE}}", &date_value(&ctx.profile.business_start_date))
        .replace("{{TZ}}", &escape_html(&ctx.profile.timezone))
        // keep an embedded </script> inside a JSON string from ending the block
        .replace("{{INITIAL_PERIODS}}", &ctx.initial_periods_json.replace("</", "<\\/"))
}

fn date_value(date: &Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

fn render_tabs(active: CycleType) -> String {
    let mut html = String::new();
    for cycle in CycleType::ALL {
        let class = if cycle == active { "tab active" } else { "tab" };
        let _ = write!(
            html,
            r#"<button class="{class}" type="button" data-cycle="{id}" role="tab" aria-selected="{selected}">{label}</button>"#,
            class = class,
            id = cycle.as_str(),
            selected = cycle == active,
            label = cycle.label(),
        );
    }
    html
}

fn render_panels(ctx: &IndexContext) -> String {
    let mut html = String::new();
    for cycle in CycleType::ALL {
        let hidden = if cycle == ctx.default_cycle { "" } else { " hidden" };
        let _ = write!(
            html,
            r#"<section id="{id}Content" class="cycle-content{hidden}">"#,
            id = cycle.as_str(),
            hidden = hidden,
        );
        if cycle == CycleType::Business {
            html.push_str(
                r#"<div class="select-row"><label for="businessSelect">Business</label><select id="businessSelect"><option value="">All businesses</option>"#,
            );
            for business in ctx.businesses {
                let _ = write!(
                    html,
                    r#"<option value="{id}">{name}</option>"#,
                    id = business.id,
                    name = escape_html(&business.name),
                );
            }
            html.push_str("</select></div>");
        }
        let _ = write!(
            html,
            r#"<div id="{id}Periods" class="period-grid">{cards}</div></section>"#,
            id = cycle.as_str(),
            cards = if cycle == ctx.default_cycle { ctx.cards_html.as_str() } else { "" },
        );
    }
    html
}

fn render_business_rows(businesses: &[Business]) -> String {
    if businesses.is_empty() {
        return r#"<p class="empty-note">No businesses yet. Add one below to see its cycle.</p>"#.to_string();
    }
    let mut html = String::new();
    for business in businesses {
        let _ = write!(
            html,
            concat!(
                r#"<div class="business-card" data-business-id="{id}">"#,
                r#"<span class="biz-name">{name}</span>"#,
                r#"<span class="biz-date">est. {date}</span>"#,
                r#"<button type="button" class="js-delete-business" data-delete-url="/businesses/{id}/delete/json/">Delete</button>"#,
                "</div>"
            ),
            id = business.id,
            name = escape_html(&business.name),
            date = business.establishment_date,
        );
    }
    html
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Life Cycles</title>
  <style>
    :root {
      --bg: #0f0a1e;
      --panel: #1a1230;
      --card: #241a3f;
      --ink: #e9e4f5;
      --muted: #9d93b8;
      --accent: #7c3aed;
      --accent-soft: #c4b5fd;
      --danger: #ef4444;
      --ok: #22c55e;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, #2b1b57, transparent 55%), var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      padding: 28px 16px 48px;
      display: flex;
      justify-content: center;
    }

    .app { width: min(960px, 100%); display: grid; gap: 22px; }

    header { display: flex; flex-wrap: wrap; align-items: baseline; justify-content: space-between; gap: 10px; }
    h1 { margin: 0; font-size: 1.9rem; color: var(--accent-soft); }
    #currentDateTime { color: var(--muted); font-size: 0.95rem; }

    .tabs { display: flex; flex-wrap: wrap; gap: 8px; }
    .tab {
      border: 1px solid #3b2a66;
      background: #1d1436;
      color: var(--accent-soft);
      border-radius: 999px;
      padding: 8px 16px;
      font-size: 0.9rem;
      cursor: pointer;
    }
    .tab.active { background: var(--accent); color: white; border-color: var(--accent); }

    .overview {
      display: grid;
      grid-template-columns: auto 1fr;
      gap: 24px;
      align-items: center;
      background: var(--panel);
      border-radius: 18px;
      padding: 22px;
    }
    #cycleRing { display: grid; justify-items: center; gap: 6px; }
    .cycle-label { color: var(--accent-soft); font-weight: 600; }
    #currentCycleInfo { display: grid; gap: 6px; }
    .summary-period { font-size: 1.25rem; font-weight: 600; color: var(--accent-soft); }
    .summary-biz { color: var(--muted); }
    .summary-ages, .summary-dates { color: var(--muted); font-size: 0.92rem; }
    .summary-suggestion, .summary-advice { color: var(--muted); }
    .summary-template { color: var(--ink); font-size: 0.95rem; }

    .cycle-content.hidden { display: none; }
    .period-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(250px, 1fr)); gap: 14px; }
    .period-card {
      background: var(--card);
      border: 1px solid #342455;
      border-radius: 14px;
      padding: 16px;
      cursor: pointer;
    }
    .period-card.active { border-color: var(--accent); box-shadow: 0 0 0 1px var(--accent); }
    .period-card h4 { margin: 0 0 6px; color: var(--accent-soft); }
    .period-card p { margin: 4px 0; color: var(--ink); font-size: 0.92rem; }
    .period-card .bounds { color: var(--muted); }
    .period-card .suggestion, .period-card .biz-label { color: var(--muted); }

    .select-row { margin-bottom: 14px; display: flex; gap: 10px; align-items: center; }
    select, input {
      background: #150e2a;
      color: var(--ink);
      border: 1px solid #3b2a66;
      border-radius: 8px;
      padding: 8px 10px;
    }

    .manage { background: var(--panel); border-radius: 18px; padding: 20px; display: grid; gap: 12px; }
    .manage h2 { margin: 0; font-size: 1.2rem; color: var(--accent-soft); }
    .business-card {
      display: flex; align-items: center; gap: 12px;
      background: var(--card); border-radius: 10px; padding: 10px 14px;
    }
    .biz-name { font-weight: 600; }
    .biz-date { color: var(--muted); font-size: 0.88rem; flex: 1; }
    button.js-delete-business {
      background: transparent; color: var(--danger);
      border: 1px solid var(--danger); border-radius: 8px; padding: 5px 10px; cursor: pointer;
    }
    .add-row { display: flex; flex-wrap: wrap; gap: 10px; }
    .add-row button, .profile-row button {
      background: var(--accent); color: white; border: none;
      border-radius: 8px; padding: 8px 14px; cursor: pointer;
    }
    .empty-note { color: var(--muted); }

    .modal {
      position: fixed; inset: 0;
      background: rgba(8, 5, 18, 0.72);
      display: flex; align-items: center; justify-content: center;
      padding: 18px;
    }
    .modal.hidden { display: none; }
    .modal-content {
      background: var(--panel);
      border-radius: 16px;
      padding: 22px;
      width: min(480px, 100%);
      display: grid; gap: 10px;
    }
    .modal-content h3 { margin: 0; color: var(--accent-soft); }
    .modal-close { justify-self: end; background: transparent; border: none; color: var(--muted); font-size: 1.1rem; cursor: pointer; }

    #toastContainer { position: fixed; top: 18px; right: 18px; display: grid; gap: 8px; z-index: 20; }
    .toast { padding: 10px 16px; border-radius: 8px; color: white; opacity: 0; transform: translateY(-8px); transition: opacity 200ms ease, transform 200ms ease; }
    .toast.ok { background: var(--ok); }
    .toast.error { background: var(--danger); }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Life Cycles</h1>
      <span id="currentDateTime"></span>
    </header>

    <div class="tabs" role="tablist">{{TABS}}</div>

    <section class="overview">
      <div id="cycleRing">{{RING}}</div>
      <div id="currentCycleInfo">{{SUMMARY}}</div>
    </section>

    {{PANELS}}

    <section class="manage">
      <h2>Businesses</h2>
      <div id="businessList">{{BUSINESS_ROWS}}</div>
      <form id="businessAddForm" class="add-row" method="post" action="/businesses/add/">
        <input type="text" name="name" placeholder="Business name" required />
        <input type="date" name="establishment_date" required />
        <button type="submit">Add business</button>
      </form>
    </section>

    <section class="manage">
      <h2>Profile</h2>
      <div class="profile-row">
        <button type="button" id="openProfileModal">Edit profile</button>
      </div>
    </section>
  </main>

  <div id="fullTemplateModal" class="modal hidden">
    <div class="modal-content">
      <button type="button" id="closeModal" class="modal-close" aria-label="Close">&times;</button>
      <h3 id="modalTitle"></h3>
      <div id="modalBody"></div>
    </div>
  </div>

  <div id="profileModal" class="modal hidden">
    <div class="modal-content">
      <button type="button" id="closeProfileModal" class="modal-close" aria-label="Close">&times;</button>
      <h3>Edit profile</h3>
      <form id="profileModalForm" data-url="/profile/update/">
        <label>Date of birth <input type="date" name="date_of_birth" value="{{DOB}}" /></label>
        <label>Business start date <input type="date" name="business_start_date" value="{{BIZ_DATE}}" /></label>
        <label>Timezone <input type="text" name="timezone" value="{{TZ}}" /></label>
        <div class="profile-row"><button type="submit">Save</button></div>
      </form>
    </div>
  </div>

  <div id="toastContainer"></div>

  <script id="initial-period-data" type="application/json">{{INITIAL_PERIODS}}</script>
  <script>
    const CYCLE_TYPES = ['human', 'daily', 'yearly', 'business', 'soul', 'health', 'reincarnation'];

    // The tab controller is the only owner of this state; nothing else
    // re-derives "what's active" from the DOM.
    const ui = {
      active: '{{DEFAULT_CYCLE}}',
      generation: 0,
      periods: []
    };

    const byId = (id) => document.getElementById(id);
    const tabs = Array.from(document.querySelectorAll('[data-cycle]'));

    const updateDateTime = () => {
      const options = {
        weekday: 'long', year: 'numeric', month: 'long', day: 'numeric',
        hour: '2-digit', minute: '2-digit', second: '2-digit'
      };
      const clock = byId('currentDateTime');
      if (clock) clock.textContent = new Date().toLocaleDateString('en-US', options);
    };
    updateDateTime();
    setInterval(updateDateTime, 1000);

    const selectTab = (cycle) => {
      if (!CYCLE_TYPES.includes(cycle)) return;
      ui.active = cycle;
      tabs.forEach((button) => {
        const isActive = button.dataset.cycle === cycle;
        button.classList.toggle('active', isActive);
        button.setAttribute('aria-selected', String(isActive));
      });
      document.querySelectorAll('.cycle-content').forEach((panel) => {
        panel.classList.toggle('hidden', panel.id !== cycle + 'Content');
      });
      loadCycle(cycle);
    };

    const loadCycle = async (cycle) => {
      const generation = ++ui.generation;
      let url = '/api/cycle_view/' + cycle + '/';
      const select = byId('businessSelect');
      if (cycle === 'business' && select && select.value) {
        url += '?business_id=' + encodeURIComponent(select.value);
      }

      try {
        const res = await fetch(url);
        if (!res.ok) {
          console.warn('cycle request failed', res.status);
          return;
        }
        const data = await res.json();
        if (generation !== ui.generation) return; // stale response, a newer tab won

        ui.periods = data.view.periods;
        const ring = byId('cycleRing');
        if (ring) ring.innerHTML = data.ring_html;
        const summary = byId('currentCycleInfo');
        if (summary) summary.innerHTML = data.summary_html;
        const panel = byId(cycle + 'Periods');
        if (panel) {
          panel.innerHTML = data.cards_html;
          bindCards(panel);
        }
      } catch (err) {
        console.error('Failed to load cycle', err);
      }
    };

    const bindCards = (container) => {
      container.querySelectorAll('[data-period-id]').forEach((card) => {
        card.addEventListener('click', () => {
          const period = ui.periods[Number(card.dataset.periodId)];
          if (period) openPeriodModal(period);
        });
      });
    };

    const modal = byId('fullTemplateModal');

    const openPeriodModal = (period) => {
      const title = byId('modalTitle');
      const body = byId('modalBody');
      if (!modal || !title || !body) return;
      title.textContent = period.name;

      let html = '';
      if (period.full_description) {
        html += '<p>' + escapeText(period.full_description) + '</p>';
      } else {
        if (period.start_date && period.end_date) {
          html += '<p><strong>From:</strong> ' + escapeText(period.start_date) +
                  ' <strong>To:</strong> ' + escapeText(period.end_date) + '</p>';
        } else if (period.start && period.end) {
          html += '<p><strong>Time:</strong> ' + escapeText(period.start) + ' - ' + escapeText(period.end) + '</p>';
        }
        if (period.principle) html += '<p><strong>Principle:</strong> ' + escapeText(period.principle) + '</p>';
        if (period.suggestion) html += '<p><strong>Suggestion:</strong> ' + escapeText(period.suggestion) + '</p>';
      }
      body.innerHTML = html;
      modal.classList.remove('hidden');
    };

    const closePeriodModal = () => {
      if (modal) modal.classList.add('hidden');
    };

    const escapeText = (value) => {
      const div = document.createElement('div');
      div.textContent = value;
      return div.innerHTML;
    };

    const closeBtn = byId('closeModal');
    if (closeBtn) closeBtn.addEventListener('click', closePeriodModal);
    if (modal) {
      modal.addEventListener('click', (event) => {
        if (event.target === modal) closePeriodModal();
      });
    }
    document.addEventListener('keydown', (event) => {
      if (event.key !== 'Escape') return;
      closePeriodModal();
      closeProfile();
    });

    const showToast = (message, level) => {
      const container = byId('toastContainer');
      if (!container) return;
      const toast = document.createElement('div');
      toast.className = 'toast ' + (level === 'ok' ? 'ok' : 'error');
      toast.textContent = message;
      container.appendChild(toast);
      requestAnimationFrame(() => {
        toast.style.opacity = '1';
        toast.style.transform = 'translateY(0)';
      });
      setTimeout(() => {
        toast.style.opacity = '0';
        toast.style.transform = 'translateY(-8px)';
        setTimeout(() => toast.remove(), 300);
      }, 3000);
    };

    const getCookie = (name) => {
      for (const cookie of document.cookie.split(';')) {
        const trimmed = cookie.trim();
        if (trimmed.startsWith(name + '=')) {
          return decodeURIComponent(trimmed.substring(name.length + 1));
        }
      }
      return null;
    };

    document.querySelectorAll('.js-delete-business').forEach((button) => {
      button.addEventListener('click', async () => {
        if (!confirm('Delete this business?')) return;
        try {
          const res = await fetch(button.dataset.deleteUrl, {
            method: 'POST',
            headers: {
              'X-Requested-With': 'XMLHttpRequest',
              'X-CSRFToken': getCookie('csrftoken') || ''
            }
          });
          const result = await res.json();
          if (result.success) {
            const card = button.closest('.business-card');
            if (card) {
              card.style.transition = 'opacity 300ms ease, transform 300ms ease';
              card.style.opacity = '0';
              card.style.transform = 'translateY(-8px)';
              setTimeout(() => card.remove(), 320);
            }
            showToast('Business deleted', 'ok');
          } else {
            showToast('Failed to delete business', 'error');
          }
        } catch (err) {
          console.error(err);
          showToast('Failed to delete business', 'error');
        }
      });
    });

    const addForm = byId('businessAddForm');
    if (addForm) {
      addForm.addEventListener('submit', async (event) => {
        event.preventDefault();
        try {
          const res = await fetch(addForm.action, {
            method: 'POST',
            headers: { 'X-Requested-With': 'XMLHttpRequest' },
            body: new URLSearchParams(new FormData(addForm))
          });
          const result = await res.json();
          if (result.success) {
            location.reload();
          } else {
            showToast('Failed to add business', 'error');
          }
        } catch (err) {
          console.error(err);
          showToast('Failed to add business', 'error');
        }
      });
    }

    const profileModal = byId('profileModal');
    const closeProfile = () => {
      if (profileModal) profileModal.classList.add('hidden');
    };
    const openProfileBtn = byId('openProfileModal');
    if (openProfileBtn && profileModal) {
      openProfileBtn.addEventListener('click', () => profileModal.classList.remove('hidden'));
    }
    const closeProfileBtn = byId('closeProfileModal');
    if (closeProfileBtn) closeProfileBtn.addEventListener('click', closeProfile);
    if (profileModal) {
      profileModal.addEventListener('click', (event) => {
        if (event.target === profileModal) closeProfile();
      });
    }

    const profileForm = byId('profileModalForm');
    if (profileForm) {
      profileForm.addEventListener('submit', async (event) => {
        event.preventDefault();
        const dob = profileForm.querySelector('input[name="date_of_birth"]');
        if (dob && dob.value && new Date(dob.value) > new Date()) {
          showToast('Date of birth cannot be in the future', 'error');
          return;
        }
        try {
          const res = await fetch(profileForm.dataset.url, {
            method: 'POST',
            headers: { 'X-Requested-With': 'XMLHttpRequest' },
            body: new FormData(profileForm)
          });
          const result = await res.json();
          if (result.success) {
            closeProfile();
            location.reload();
          } else {
            showToast('Failed to update profile', 'error');
          }
        } catch (err) {
          console.error(err);
          showToast('Failed to update profile', 'error');
        }
      });
    }

    const businessSelect = byId('businessSelect');
    if (businessSelect) {
      businessSelect.addEventListener('change', () => {
        if (ui.active === 'business') loadCycle('business');
      });
    }

    tabs.forEach((button) => {
      button.addEventListener('click', () => selectTab(button.dataset.cycle));
    });

    // the first paint was server-rendered; only wire up its cards
    const initialData = byId('initial-period-data');
    if (initialData) {
      try {
        ui.periods = JSON.parse(initialData.textContent || '[]');
      } catch (err) {
        console.warn('failed to parse initial period data', err);
      }
    }
    const initialPanel = byId(ui.active + 'Periods');
    if (initialPanel) bindCards(initialPanel);
  </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn index_renders_every_tab_and_panel() {
        let profile = Profile::default();
        let ctx = IndexContext {
            default_cycle: CycleType::Human,
            ring_html: "<svg></svg>".into(),
            summary_html: String::new(),
            cards_html: String::new(),
            initial_periods_json: "[]".into(),
            businesses: &[],
            profile: &profile,
        };
        let html = render_index(&ctx);
        for cycle in CycleType::ALL {
            assert!(html.contains(&format!(r#"data-cycle="{}""#, cycle.as_str())));
            assert!(html.contains(&format!(r#"id="{}Periods""#, cycle.as_str())));
        }
        // only the default panel is visible
        assert_eq!(html.matches(r#"class="cycle-content hidden""#).count(), 6);
        assert!(html.contains(r#"id="humanContent" class="cycle-content""#));
    }

    #[test]
    fn index_lists_businesses_with_delete_urls() {
        let profile = Profile::default();
        let businesses = vec![Business {
            id: 3,
            name: "Acme & Sons".into(),
            establishment_date: NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
        }];
        let ctx = IndexContext {
            default_cycle: CycleType::Human,
            ring_html: String::new(),
            summary_html: String::new(),
            cards_html: String::new(),
            initial_periods_json: "[]".into(),
            businesses: &businesses,
            profile: &profile,
        };
        let html = render_index(&ctx);
        assert!(html.contains("/businesses/3/delete/json/"));
        assert!(html.contains("Acme &amp; Sons"));
        assert!(html.contains(r#"<option value="3">"#));
    }

    #[test]
    fn embedded_json_cannot_break_out_of_its_script_block() {
        let profile = Profile::default();
        let ctx = IndexContext {
            default_cycle: CycleType::Human,
            ring_html: String::new(),
            summary_html: String::new(),
            cards_html: String::new(),
            initial_periods_json: r#"[{"name":"</script><script>"}]"#.into(),
            businesses: &[],
            profile: &profile,
        };
        let html = render_index(&ctx);
        assert!(!html.contains(r#""name":"</script>"#));
    }
}
