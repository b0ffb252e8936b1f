pub fn render_index(date: &str) -> String {
    INDEX_HTML.replace("{{DATE}}", date)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Daily Activities</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --done: #2d7a4b;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 120px;
    }

    .app {
      width: min(720px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
      margin: 0;
    }

    .subtitle {
      margin: 4px 0 0;
      color: #5f5c57;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button.secondary {
      background: var(--accent-2);
    }

    #activities {
      display: grid;
      gap: 10px;
    }

    .activity-item {
      background: white;
      border-radius: 16px;
      padding: 14px 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      cursor: pointer;
    }

    .empty {
      color: #8b857d;
    }

    .popup {
      position: fixed;
      inset: 0;
      background: rgba(43, 42, 40, 0.35);
      display: grid;
      place-items: center;
    }

    .popup form {
      background: white;
      border-radius: 20px;
      padding: 24px;
      display: grid;
      gap: 12px;
      width: min(360px, 90vw);
    }

    .popup input {
      padding: 10px 12px;
      border-radius: 10px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      font: inherit;
    }

    #bottom-nav {
      position: fixed;
      left: 0;
      right: 0;
      bottom: 0;
      background: white;
      box-shadow: 0 -8px 24px rgba(47, 72, 88, 0.15);
      padding: 16px;
      display: grid;
      gap: 10px;
      justify-items: center;
    }

    #bottom-nav .actions {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    .hidden {
      display: none !important;
    }

    .status {
      min-height: 1.2em;
      color: #c63b2b;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Daily Activities</h1>
        <p class="subtitle">Today is <span id="today">{{DATE}}</span></p>
      </div>
      <button id="add-activity-btn" type="button">Add activity</button>
    </header>
    <section id="activities"></section>
    <div class="status" id="status"></div>
  </main>

  <div id="add-activity-popup" class="popup hidden">
    <form id="add-activity-form">
      <h2>New activity</h2>
      <input id="activity-desc" type="text" placeholder="Description" required />
      <input id="activity-time" type="time" required />
      <button type="submit">Save</button>
      <button id="close-popup-btn" class="secondary" type="button">Cancel</button>
    </form>
  </div>

  <div id="edit-activity-popup" class="popup hidden">
    <form id="edit-activity-form">
      <h2>Edit activity</h2>
      <input id="edit-activity-desc" type="text" required />
      <input id="edit-activity-time" type="time" required />
      <button id="save-edit-btn" type="submit">Save</button>
      <button id="close-edit-popup-btn" class="secondary" type="button">Cancel</button>
    </form>
  </div>

  <nav id="bottom-nav" class="hidden">
    <span id="selected-activity"></span>
    <div class="actions">
      <button id="complete-btn" type="button">Complete</button>
      <button id="edit-btn" class="secondary" type="button">Edit</button>
      <button id="share-btn" class="secondary" type="button">Share</button>
      <button id="delete-btn" type="button">Delete</button>
      <button id="close-nav-btn" class="secondary" type="button">Close</button>
    </div>
  </nav>

  <script>
    const el = (id) => document.getElementById(id);
    const listEl = el('activities');
    const statusEl = el('status');
    const nav = el('bottom-nav');
    let lastSeq = 0;

    const setStatus = (message) => {
      statusEl.textContent = message || '';
    };

    const api = async (method, path, body) => {
      const res = await fetch(path, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    const render = (views) => {
      listEl.innerHTML = '';
      if (!views.length) {
        listEl.innerHTML = '<p class="empty">No activities yet.</p>';
        return;
      }
      views.forEach((view) => {
        const item = document.createElement('div');
        item.className = 'activity-item';
        item.style.color = view.color;
        item.textContent = view.text;
        item.addEventListener('click', () => openNav(view));
        listEl.appendChild(item);
      });
    };

    const refresh = async () => render(await api('GET', '/api/activities'));

    const closeNav = () => nav.classList.add('hidden');

    const openNav = (view) => {
      el('selected-activity').textContent = view.text;
      nav.classList.remove('hidden');

      el('complete-btn').onclick = async () => {
        const res = await api('POST', `/api/activities/${view.id}/complete`);
        alert(res.message);
        closeNav();
        await refresh();
      };

      el('edit-btn').onclick = () => openEdit(view);

      el('share-btn').onclick = async () => {
        const res = await api('POST', `/api/activities/${view.id}/share`);
        if (res.outcome === 'shared') {
          return;
        }
        if (navigator.share) {
          navigator.share(res.payload)
            .then(() => console.log('Share was successful.'))
            .catch((error) => console.log('Sharing failed:', error));
        } else {
          alert(res.message || 'Sharing is not supported in this browser.');
        }
      };

      el('delete-btn').onclick = async () => {
        if (confirm(`Are you sure you want to delete: ${view.text}?`)) {
          await api('DELETE', `/api/activities/${view.id}`);
          closeNav();
          await refresh();
        }
      };
    };

    const openEdit = (view) => {
      const popup = el('edit-activity-popup');
      el('edit-activity-desc').value = view.description;
      el('edit-activity-time').value = view.time;
      popup.classList.remove('hidden');

      el('edit-activity-form').onsubmit = async (event) => {
        event.preventDefault();
        await api('PUT', `/api/activities/${view.id}`, {
          description: el('edit-activity-desc').value,
          time: el('edit-activity-time').value
        });
        popup.classList.add('hidden');
        closeNav();
        await refresh();
      };
    };

    const reportPermission = async (permission) => {
      await api('POST', '/api/notifications/permission', { permission });
    };

    const askPermission = async () => {
      if (!('Notification' in window)) {
        return;
      }
      const permission = Notification.permission === 'default'
        ? await Notification.requestPermission()
        : Notification.permission;
      await reportPermission(permission);
    };

    const handleEvent = (event) => {
      if (event.kind === 'alert') {
        alert(event.message);
      } else if (event.kind === 'notification') {
        if ('Notification' in window && Notification.permission === 'granted') {
          new Notification(event.title, { body: event.body });
        }
      } else if (event.kind === 'sound') {
        new Audio(event.resource).play().catch((error) => {
          console.error('Error playing audio:', error);
        });
      } else if (event.kind === 'permissionRequest') {
        askPermission().catch((err) => setStatus(err.message));
      }
    };

    const pollAlerts = async () => {
      const events = await api('GET', `/api/alerts?after=${lastSeq}`);
      if (!events.length) {
        return;
      }
      events.forEach((event) => {
        lastSeq = Math.max(lastSeq, event.seq);
        handleEvent(event);
      });
      await refresh();
    };

    el('add-activity-btn').addEventListener('click', () => {
      el('add-activity-popup').classList.remove('hidden');
    });

    el('close-popup-btn').addEventListener('click', () => {
      el('add-activity-popup').classList.add('hidden');
    });

    el('close-edit-popup-btn').addEventListener('click', () => {
      el('edit-activity-popup').classList.add('hidden');
    });

    el('close-nav-btn').addEventListener('click', closeNav);

    el('add-activity-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      try {
        await api('POST', '/api/activities', {
          description: el('activity-desc').value,
          time: el('activity-time').value
        });
        el('activity-desc').value = '';
        el('activity-time').value = '';
        el('add-activity-popup').classList.add('hidden');
        setStatus('');
        await refresh();
      } catch (err) {
        setStatus(err.message);
      }
    });

    api('GET', '/api/alerts?after=0')
      .then((events) => {
        events.forEach((event) => { lastSeq = Math.max(lastSeq, event.seq); });
      })
      .catch(() => {});
    askPermission().catch(() => {});
    refresh().catch((err) => setStatus(err.message));
    setInterval(() => pollAlerts().catch((err) => setStatus(err.message)), 5000);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_shows_todays_date() {
        let html = render_index("1/2/2024");
        assert!(html.contains("Today is <span id=\"today\">1/2/2024</span>"));
        assert!(!html.contains("{{DATE}}"));
    }
}
