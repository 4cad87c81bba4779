//! Drives a call through its menus across separate requests, rebuilding the
//! state machine from the database each time.

use rusqlite::Connection;
use switchboard_calls::{create_call, get_call, Call, CreateCallParams, SqliteMenuStore};
use switchboard_menu::{InputOutcome, MenuError, MenuRegistry, MenuStateMachine, TwimlRenderer};
use switchboard_types::{InputBag, MenuName};

fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().expect("failed to open in-memory db");
    switchboard_db::run_migrations(&conn).expect("failed to run migrations");
    conn
}

fn menus() -> MenuRegistry<Call> {
    let mut registry: MenuRegistry<Call> = MenuRegistry::new();
    registry
        .register("opening_menu", |b, call| {
            b.gather(|b| {
                b.prompt(1, "Press 1 to go to the second menu", "second_menu");
            });
            b.say(format!("Call {}", call.call_sid));
        })
        .register("second_menu", |b, _| {
            b.say("this is the second menu");
            b.press("*", "opening_menu");
        });
    registry
}

fn handle_request(
    conn: &Connection,
    registry: &MenuRegistry<Call>,
    call_id: i64,
    input: Option<InputBag>,
) -> Result<String, MenuError> {
    let mut call = get_call(conn, call_id).expect("call should exist");
    let mut machine = MenuStateMachine::new(registry, SqliteMenuStore::new(conn, call_id))?;
    if let Some(input) = input {
        machine.process_input(&mut call, input)?;
    }
    machine.render(&call, &TwimlRenderer)
}

#[test]
fn menu_survives_across_requests() {
    let conn = setup_db();
    let registry = menus();
    let call = create_call(
        &conn,
        &CreateCallParams {
            call_sid: "CA-flow".to_string(),
            ..CreateCallParams::default()
        },
    )
    .expect("failed to create call");

    let first = handle_request(&conn, &registry, call.id, None).expect("first request");
    assert!(first.contains("<Say>Call CA-flow</Say>"));
    assert_eq!(get_call(&conn, call.id).expect("get").current_menu, None);

    let second = handle_request(&conn, &registry, call.id, Some(InputBag::digits("1")))
        .expect("second request");
    assert!(second.contains("this is the second menu"));
    assert_eq!(
        get_call(&conn, call.id).expect("get").current_menu,
        Some(MenuName::new("second_menu"))
    );

    let third = handle_request(&conn, &registry, call.id, None).expect("third request");
    assert_eq!(second, third);

    handle_request(&conn, &registry, call.id, Some(InputBag::digits("*")))
        .expect("fourth request");
    assert_eq!(
        get_call(&conn, call.id).expect("get").current_menu,
        Some(MenuName::new("opening_menu"))
    );
}

#[test]
fn deleted_call_fails_the_transition_with_a_persistence_error() {
    let conn = setup_db();
    let registry = menus();
    let call = create_call(
        &conn,
        &CreateCallParams {
            call_sid: "CA-gone".to_string(),
            ..CreateCallParams::default()
        },
    )
    .expect("failed to create call");

    let mut entity = call.clone();
    let mut machine = MenuStateMachine::new(&registry, SqliteMenuStore::new(&conn, call.id))
        .expect("machine should load");
    conn.execute("DELETE FROM calls WHERE id = ?1", [call.id])
        .expect("failed to delete call");

    let err = machine
        .process_input(&mut entity, InputBag::digits("1"))
        .expect_err("transition should fail");
    assert!(matches!(err, MenuError::Persistence(_)));
    assert_eq!(machine.current_menu().as_str(), "opening_menu");
}

#[test]
fn unmatched_input_leaves_the_row_untouched() {
    let conn = setup_db();
    let registry = menus();
    let call = create_call(
        &conn,
        &CreateCallParams {
            call_sid: "CA-stay".to_string(),
            ..CreateCallParams::default()
        },
    )
    .expect("failed to create call");

    let mut entity = call.clone();
    let mut machine = MenuStateMachine::new(&registry, SqliteMenuStore::new(&conn, call.id))
        .expect("machine should load");
    let outcome = machine
        .process_input(&mut entity, InputBag::digits("7"))
        .expect("process input");

    assert_eq!(
        outcome,
        InputOutcome::NoMatch {
            input: "7".to_string()
        }
    );
    assert_eq!(get_call(&conn, call.id).expect("get").current_menu, None);
}
