//! BDD step definitions for the dispatch feature

use cucumber::{given, then, when};

use crate::world::{make_alert, parse_priority, tier_settings, MailerWorld};

fn flag(s: &str) -> bool {
    match s {
        "on" => true,
        "off" => false,
        other => panic!("Expected on/off, got {}", other),
    }
}

#[given("notifications are enabled for high priority only")]
fn enabled_high_only(world: &mut MailerWorld) {
    world.settings = Some(tier_settings(true, true, false, false));
}

#[given("notifications are enabled for all priorities")]
fn enabled_all(world: &mut MailerWorld) {
    world.settings = Some(tier_settings(true, true, true, true));
}

#[given("notifications are disabled")]
fn disabled(world: &mut MailerWorld) {
    world.settings = Some(tier_settings(false, true, true, true));
}

#[given(expr = "notifications are enabled with tiers high {string}, medium {string}, low {string}")]
fn enabled_with_tiers(world: &mut MailerWorld, high: String, medium: String, low: String) {
    world.settings = Some(tier_settings(true, flag(&high), flag(&medium), flag(&low)));
}

#[given("a reachable mail transport")]
fn reachable_transport(world: &mut MailerWorld) {
    world.reachable = Some(true);
}

#[given("an unreachable mail transport")]
fn unreachable_transport(world: &mut MailerWorld) {
    world.reachable = Some(false);
}

#[given(expr = "a {string} priority alert for {string}")]
fn alert_for(world: &mut MailerWorld, priority: String, ticker: String) {
    world.alert = Some(make_alert(&ticker, parse_priority(&priority)));
}

#[when("the alert is sent")]
async fn send_alert(world: &mut MailerWorld) {
    let alert = world.alert.clone().expect("alert not set");
    let result = world.dispatcher().send_alert(&alert).await;
    world.send_result = Some(result);
}

#[when(expr = "alerts {string} are sent in bulk")]
async fn send_bulk(world: &mut MailerWorld, list: String) {
    let alerts: Vec<_> = list
        .split(',')
        .map(|item| {
            let (ticker, priority) = item
                .trim()
                .split_once(':')
                .expect("expected TICKER:priority");
            make_alert(ticker, parse_priority(priority))
        })
        .collect();

    let dispatcher = world.dispatcher();
    let start = std::time::Instant::now();
    let outcome = dispatcher.send_bulk_alerts(&alerts).await;
    world.bulk_elapsed = Some(start.elapsed());
    world.bulk_result = Some(outcome);
}

#[when("the connection is tested")]
async fn test_connection(world: &mut MailerWorld) {
    let result = world.dispatcher().test_connection().await;
    world.connection_result = Some(result);
}

#[when(expr = "the settings are replaced with recipient {string}")]
fn replace_settings(world: &mut MailerWorld, recipient: String) {
    let mut settings = world
        .settings
        .clone()
        .unwrap_or_else(|| tier_settings(true, true, false, false));
    settings.email = recipient;
    world
        .dispatcher()
        .replace_settings(settings)
        .expect("replace_settings failed");
}

#[then("the send should succeed")]
fn send_succeeds(world: &mut MailerWorld) {
    assert_eq!(world.send_result, Some(true));
}

#[then("the send should fail")]
fn send_fails(world: &mut MailerWorld) {
    assert_eq!(world.send_result, Some(false));
}

#[then(regex = r"^the transport should have received (\d+) message(?:s|\(s\))?$")]
fn transport_received(world: &mut MailerWorld, count: usize) {
    assert_eq!(world.outbox.mails().len(), count);
}

#[then(expr = "the last message subject should contain {string}")]
fn last_subject_contains(world: &mut MailerWorld, expected: String) {
    let mails = world.outbox.mails();
    let last = mails.last().expect("no message sent");
    assert!(
        last.subject.contains(&expected),
        "Expected subject to contain '{}', got '{}'",
        expected,
        last.subject
    );
}

#[then(expr = "the last message recipient should be {string}")]
fn last_recipient(world: &mut MailerWorld, expected: String) {
    let mails = world.outbox.mails();
    let last = mails.last().expect("no message sent");
    assert_eq!(last.recipient, expected);
}

#[then(expr = "the bulk result should be {int} sent and {int} failed")]
fn bulk_result(world: &mut MailerWorld, sent: usize, failed: usize) {
    let outcome = world.bulk_result.expect("no bulk result");
    assert_eq!(outcome.sent, sent);
    assert_eq!(outcome.failed, failed);
}

#[then(expr = "the transport should have received messages for {string} in order")]
fn received_in_order(world: &mut MailerWorld, tickers: String) {
    let mails = world.outbox.mails();
    let expected: Vec<&str> = tickers.split(',').map(str::trim).collect();
    assert_eq!(mails.len(), expected.len());
    for (mail, ticker) in mails.iter().zip(expected) {
        assert!(
            mail.subject.contains(&format!(": {} -", ticker)),
            "Expected subject for {}, got '{}'",
            ticker,
            mail.subject
        );
    }
}

#[then(expr = "the bulk send should have taken at least {int} second(s)")]
fn bulk_took_at_least(world: &mut MailerWorld, seconds: u64) {
    let elapsed = world.bulk_elapsed.expect("no bulk send timed");
    assert!(
        elapsed >= std::time::Duration::from_secs(seconds),
        "bulk send took {:?}",
        elapsed
    );
}

#[then("the connection test should fail")]
fn connection_fails(world: &mut MailerWorld) {
    assert_eq!(world.connection_result, Some(false));
}

#[then("the connection test should succeed")]
fn connection_succeeds(world: &mut MailerWorld) {
    assert_eq!(world.connection_result, Some(true));
}
