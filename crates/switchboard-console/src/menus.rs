//! The demo call menus.

use switchboard_calls::Call;
use switchboard_menu::{MenuRegistry, Transition};

/// Builds the demo menu tree for calls, starting in `default_menu`.
pub fn call_menus(default_menu: &str) -> MenuRegistry<Call> {
    let mut registry = MenuRegistry::with_default_menu(default_menu);
    registry
        .register_callback("log_choice", |call: &mut Call, input, raw, value| {
            tracing::info!(
                call_sid = %call.call_sid,
                from = input.get("From").unwrap_or("unknown"),
                input = %raw,
                value = ?value,
                "caller made a choice"
            );
            Ok(())
        })
        .register("opening_menu", |b, call| {
            b.play("/test-sound.mp3");
            b.say("This is the first menu")
                .attr("voice", "woman")
                .attr("language", "en-gb");
            b.sms("Whatever I want to say")
                .attr("to", 3_602_636_483_i64)
                .attr("from", "0000000000");
            b.gather(|b| {
                b.prompt(
                    1,
                    "Press 1 to go to the second menu",
                    Transition::to("second_menu")
                        .with_callback("log_choice")
                        .with_value("second"),
                );
                b.prompt(2, "Press 2 to go to the third menu", "third_menu");
            });
            b.say(call.id.to_string());
        })
        .register("second_menu", |b, _| {
            b.say("this is the second menu");
            b.gather(|b| {
                b.prompt("*", "Press star to start over", "opening_menu");
            });
        })
        .register("third_menu", |b, _| {
            b.say("This is the third menu");
            b.gather(|b| {
                b.prompt(1, "Press 1 to go to the fourth menu", "fourth_menu");
            });
        })
        .register("fourth_menu", |b, _| {
            b.say("You have arrived at the fourth menu!");
            b.hangup();
        });
    registry
}
