use std::time::{Duration, Instant};

use hrms_lib::model::AttendanceStatus;
use hrms_ui::{AlertLevel, InputEvent, Key, Modifiers, MouseButton, RowStore};

use super::*;
use crate::mock_api::{self, MockApi};
use crate::settings::tests::memory_settings;
use crate::wakeup;

async fn loaded_app() -> (App, MockApi) {
    let api = MockApi::start(mock_api::healthy()).await;
    let (tx, _rx) = wakeup::channel();
    let mut app = App::new(api.client.clone(), Some(memory_settings()), None, (100, 30), tx);
    app.store.refresh().await.unwrap();
    app.store.load_employees().await.unwrap();
    app.render(Instant::now());
    (app, api)
}

fn press(app: &mut App, key: Key) {
    app.handle_event(InputEvent::Key {
        key,
        modifiers: Modifiers::default(),
    });
}

fn click(app: &mut App, x: u16, y: u16) {
    app.handle_event(InputEvent::PointerDown {
        x,
        y,
        button: MouseButton::Left,
    });
}

async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition never held");
}

// =============================================================================
// Row editing
// =============================================================================

#[tokio::test]
async fn test_edit_then_cancel_leaves_store_alone() {
    let (mut app, api) = loaded_app().await;
    let before = api.requests().len();

    press(&mut app, Key::Char('e'));
    assert!(app.sessions.is_editing(&7));

    press(&mut app, Key::Right);
    assert_eq!(
        app.sessions.active().map(|s| s.draft),
        Some(AttendanceStatus::Present)
    );

    press(&mut app, Key::Escape);
    assert!(app.sessions.active().is_none());
    assert_eq!(app.records()[0].status, AttendanceStatus::Absent);
    assert_eq!(api.requests().len(), before);
}

#[tokio::test]
async fn test_editing_another_row_replaces_session() {
    let (mut app, _api) = loaded_app().await;

    press(&mut app, Key::Char('e'));
    press(&mut app, Key::Char('p'));
    press(&mut app, Key::Down);
    press(&mut app, Key::Char('e'));

    assert!(!app.sessions.is_editing(&7));
    let session = app.sessions.active().unwrap();
    assert_eq!(session.row_id, 6);
    assert_eq!(session.draft, AttendanceStatus::Present);
}

#[tokio::test]
async fn test_draft_keys_ignored_off_session_row() {
    let (mut app, api) = loaded_app().await;

    press(&mut app, Key::Char('e'));
    press(&mut app, Key::Down);
    press(&mut app, Key::Char('p'));
    press(&mut app, Key::Right);

    let session = app.sessions.active().unwrap();
    assert_eq!(session.row_id, 7);
    assert_eq!(session.draft, AttendanceStatus::Absent);

    press(&mut app, Key::Up);
    press(&mut app, Key::Char('p'));
    assert_eq!(
        app.sessions.active().map(|s| s.draft),
        Some(AttendanceStatus::Present)
    );
    assert!(!api.requests().iter().any(|(method, _)| method == "PATCH"));
}

#[tokio::test]
async fn test_enter_saves_draft() {
    let (mut app, api) = loaded_app().await;

    press(&mut app, Key::Enter);
    press(&mut app, Key::Char('p'));
    press(&mut app, Key::Enter);

    let alerts = app.alerts.clone();
    eventually(|| !alerts.all().is_empty()).await;

    assert!(app.sessions.active().is_none());
    assert_eq!(alerts.all()[0].message, SAVED_MESSAGE);
    assert_eq!(alerts.all()[0].level, AlertLevel::Success);
    assert!(
        api.requests()
            .contains(&("PATCH".to_string(), "/api/attendance/7/".to_string()))
    );
}

#[tokio::test]
async fn test_draft_rendered_on_editing_row() {
    let (mut app, _api) = loaded_app().await;
    press(&mut app, Key::Char('e'));
    press(&mut app, Key::Left);

    let frame = app.render(Instant::now());
    let row = frame.row_text(app.layout.table_body.y);
    assert!(row.contains("Bob Stone"));
    assert!(row.contains("◂ Present ▸"), "{row}");

    let other = frame.row_text(app.layout.table_body.y + 1);
    assert!(other.contains("Present"));
    assert!(!other.contains('◂'));
}

// =============================================================================
// Dropdowns
// =============================================================================

#[tokio::test]
async fn test_filter_by_keyboard() {
    let (mut app, _api) = loaded_app().await;

    press(&mut app, Key::Tab);
    assert_eq!(app.focus(), Focus::Filter);
    press(&mut app, Key::Enter);
    assert!(app.filter.is_open());
    assert_eq!(app.screen.surfaces().len(), 1);

    press(&mut app, Key::Down);
    press(&mut app, Key::Enter);

    assert!(!app.filter.is_open());
    assert!(app.screen.listeners().is_empty());
    assert_eq!(app.store.filter_employee(), Some(1));

    let settings = app.settings.clone().unwrap();
    let mut stored = None;
    for _ in 0..200 {
        stored = settings
            .get::<Option<u64>>(keys::FILTER_EMPLOYEE)
            .await
            .unwrap();
        if stored.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(stored, Some(Some(1)));
}

#[tokio::test]
async fn test_click_outside_closes_and_reaches_table() {
    let (mut app, _api) = loaded_app().await;
    let trigger = app.layout.filter_trigger;

    click(&mut app, trigger.x + 1, trigger.y);
    assert!(app.filter.is_open());

    let row_y = app.layout.table_body.y + 1;
    click(&mut app, 3, row_y + 10);
    assert!(!app.filter.is_open());
    assert!(app.screen.listeners().is_empty());

    click(&mut app, 3, row_y);
    assert_eq!(app.cursor, 1);
    assert_eq!(app.focus(), Focus::Table);
}

#[tokio::test]
async fn test_panel_click_picks_employee() {
    let (mut app, _api) = loaded_app().await;
    let trigger = app.layout.mark_trigger;

    click(&mut app, trigger.x, trigger.y);
    let frame = app.render(Instant::now());
    let panel = app.mark_employee.overlay().panel_area().unwrap();
    assert!(frame.row_text(panel.y + 1).contains("Bob Stone (EMP002)"));

    click(&mut app, panel.x + 2, panel.y + 1);
    assert_eq!(app.mark_employee.value().as_deref(), Some("2"));
    assert!(!app.mark_employee.is_open());
    assert!(app.screen.surfaces().is_empty());
}

#[tokio::test]
async fn test_resize_closes_dropdown() {
    let (mut app, _api) = loaded_app().await;
    press(&mut app, Key::Tab);
    press(&mut app, Key::Enter);
    assert!(app.filter.is_open());

    app.handle_event(InputEvent::Resize {
        width: 120,
        height: 40,
    });
    assert!(!app.filter.is_open());
    assert_eq!(app.render(Instant::now()).width(), 120);
}

#[tokio::test]
async fn test_tab_while_open_moves_on() {
    let (mut app, _api) = loaded_app().await;
    press(&mut app, Key::Tab);
    press(&mut app, Key::Enter);

    press(&mut app, Key::Tab);
    assert!(!app.filter.is_open());
    assert_eq!(app.focus(), Focus::MarkEmployee);
}

// =============================================================================
// Marking and chrome
// =============================================================================

#[tokio::test]
async fn test_mark_without_employee_alerts() {
    let (mut app, api) = loaded_app().await;
    let before = api.requests().len();

    press(&mut app, Key::Char('m'));

    let alerts = app.alerts.all();
    assert_eq!(alerts[0].message, NO_EMPLOYEE_MESSAGE);
    assert_eq!(alerts[0].level, AlertLevel::Error);
    assert_eq!(api.requests().len(), before);
}

#[tokio::test]
async fn test_status_toggle_keys() {
    let (mut app, _api) = loaded_app().await;
    app.focus = Focus::MarkStatus;

    press(&mut app, Key::Right);
    assert_eq!(app.mark_status, AttendanceStatus::Absent);
    press(&mut app, Key::Char('p'));
    assert_eq!(app.mark_status, AttendanceStatus::Present);
}

#[tokio::test]
async fn test_header_shows_today() {
    let (mut app, _api) = loaded_app().await;
    let frame = app.render(Instant::now());
    assert!(frame.row_text(0).contains("Present 1  Absent 1  Not marked 0  of 2"));
}

#[tokio::test]
async fn test_empty_table_message() {
    let api = MockApi::start(mock_api::healthy()).await;
    let (tx, _rx) = wakeup::channel();
    let mut app = App::new(api.client.clone(), None, None, (100, 30), tx);

    let frame = app.render(Instant::now());
    assert!(frame.row_text(app.layout.table_body.y).contains("Loading…"));

    app.store.set_filter_employee(Some(42));
    app.store.replace_records(Vec::new());
    let frame = app.render(Instant::now());
    assert!(
        frame
            .row_text(app.layout.table_body.y)
            .contains("No attendance records found.")
    );
}

#[tokio::test]
async fn test_quit_keys() {
    let (mut app, _api) = loaded_app().await;
    press(&mut app, Key::Char('q'));
    assert!(app.should_quit());

    let (mut app, _api) = loaded_app().await;
    app.handle_event(InputEvent::Key {
        key: Key::Char('c'),
        modifiers: Modifiers::ctrl(),
    });
    assert!(app.should_quit());
}

#[test]
fn test_focus_cycle() {
    let mut focus = Focus::Table;
    for _ in 0..4 {
        focus = focus.next();
    }
    assert_eq!(focus, Focus::Table);
    assert_eq!(Focus::Filter.prev(), Focus::Table);
}

#[tokio::test]
async fn test_store_refresh_is_row_store() {
    let (app, api) = loaded_app().await;
    let before = api.requests().len();
    RowStore::refresh(app.store.as_ref()).await.unwrap();
    assert_eq!(api.requests().len(), before + 2);
}
