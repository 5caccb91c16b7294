//! Envelope assembly and dispatch policies, end to end.

#![allow(clippy::unwrap_used)]

use courier::enclosure::EnPlain;
use courier::envelope::{Constant, Draft, EnvelopeCache, Mime, Safe, Strict};
use courier::postman::{PostNoDrafts, PostNoLoops};
use courier::stamp::{StCc, StHeader, StRecipient, StReplyTo, StSender, StSubject};
use courier::{Envelope, ErrorKind, Postman};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct Counting(AtomicUsize);

impl Counting {
    fn sent(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Postman for Counting {
    fn send(&self, _envelope: &dyn Envelope) -> courier::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

proptest! {
    #[test]
    fn with_never_changes_the_receiver(subjects in proptest::collection::vec("[a-zA-Z0-9 ]{1,20}", 1..8)) {
        let base = Mime::new()
            .with(StRecipient::new("to@example.com").unwrap())
            .with(EnPlain::new("body"));
        let stamps = base.stamps().to_vec();
        let enclosures = base.enclosures().to_vec();

        let mut grown = base.clone();
        for subject in &subjects {
            grown = grown
                .with(StSubject::new(subject.as_str()))
                .with(EnPlain::new(subject.as_str()));
        }

        prop_assert_eq!(base.stamps(), stamps.as_slice());
        prop_assert_eq!(base.enclosures(), enclosures.as_slice());
        prop_assert_eq!(grown.stamps().len(), stamps.len() + subjects.len());
        prop_assert_eq!(base.unwrap().unwrap().parts.len(), 1);
    }

    #[test]
    fn parts_follow_enclosure_order(
        texts in proptest::collection::btree_set("[a-z]{1,12}", 1..6)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
            .prop_shuffle()
    ) {
        let envelope = texts
            .iter()
            .fold(Mime::new(), |env, text| env.with(EnPlain::new(text.as_str())));
        let message = envelope.unwrap().unwrap();

        let bodies: Vec<String> = message
            .parts
            .iter()
            .map(|part| part.body_text().unwrap())
            .collect();
        prop_assert_eq!(bodies, texts);
    }
}

#[test]
fn strict_rejects_what_safe_repairs() {
    let envelope = Mime::new()
        .with(StRecipient::new("to@example.com").unwrap())
        .with(StSubject::new("no sender"));

    let err = Strict::new(&envelope).unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let message = Safe::new(&envelope).unwrap().unwrap();
    assert_eq!(message.from()[0].address.as_str(), "from@example.com");
    assert_eq!(message.raw_subject(), Some("no sender"));
}

#[test]
fn cyrillic_subject_is_encoded() {
    let message = Mime::new()
        .with(StSubject::new("how are you, друг?"))
        .unwrap()
        .unwrap();

    let raw = message.raw_subject().unwrap();
    assert!(raw.contains("=?UTF-8?Q?"));
    assert!(raw.is_ascii());
    assert!(message.subject().unwrap().contains("друг"));

    let rendered = message.to_rfc5322().unwrap();
    assert!(rendered.is_ascii());
}

#[test]
fn absent_text_fails_only_when_assembled() {
    let absent: EnPlain = serde_json::from_str("{}").unwrap();
    let envelope = Mime::new().with(absent);
    assert_eq!(envelope.enclosures().len(), 1);
    assert_eq!(envelope.unwrap().unwrap_err().kind(), ErrorKind::Construction);
}

#[test]
fn custom_headers_keep_their_order() {
    let message = Mime::new()
        .with(StHeader::new("X-First", "1"))
        .with(StHeader::new("X-Second", "2"))
        .with(StHeader::new("X-First", "3"))
        .unwrap()
        .unwrap();

    let values = message.headers.get_all("X-First");
    assert_eq!(values, ["1", "3"]);
    assert_eq!(message.headers.get("x-second"), Some("2"));
}

#[test]
fn drafts_are_not_posted() {
    let origin = Counting::default();
    let postman = PostNoDrafts::new(&origin);
    let envelope = Mime::new().with(StSubject::new("wip"));

    postman.send(&Draft::new(&envelope)).unwrap();
    assert_eq!(origin.sent(), 0);

    postman.send(&envelope).unwrap();
    assert_eq!(origin.sent(), 1);
}

#[test]
fn loops_are_not_posted() {
    let origin = Counting::default();
    let postman = PostNoLoops::new(&origin);

    let looping = Mime::new()
        .with(StRecipient::new("a@x.com").unwrap())
        .with(StSender::new("J <a@x.com>").unwrap());
    postman.send(&looping).unwrap();
    assert_eq!(origin.sent(), 0);

    let via_reply_to = Mime::new()
        .with(StSender::new("me@x.com").unwrap())
        .with(StCc::new("list@x.com").unwrap())
        .with(StReplyTo::new("LIST@x.com").unwrap());
    postman.send(&via_reply_to).unwrap();
    assert_eq!(origin.sent(), 0);

    let distinct = Mime::new()
        .with(StRecipient::new("b@x.com").unwrap())
        .with(StSender::new("J <a@x.com>").unwrap());
    postman.send(&distinct).unwrap();
    assert_eq!(origin.sent(), 1);
}

#[test]
fn policies_stack() {
    let origin = Counting::default();
    let postman = PostNoDrafts::new(PostNoLoops::new(&origin));
    let envelope = Mime::new()
        .with(StRecipient::new("b@x.com").unwrap())
        .with(StSender::new("a@x.com").unwrap());

    postman.send(&Draft::new(&envelope)).unwrap();
    postman.send(&envelope).unwrap();
    assert_eq!(origin.sent(), 1);
}

#[test]
fn constant_serves_decorated_chains() {
    let cache = Arc::new(EnvelopeCache::new());
    let envelope = Mime::new()
        .with(StRecipient::new("to@example.com").unwrap())
        .with(EnPlain::new("cached"));

    let safe = Constant::new(Safe::new(envelope.clone()), Arc::clone(&cache));
    let draft = Constant::new(Draft::new(envelope), Arc::clone(&cache));

    let first = safe.unwrap().unwrap();
    assert!(Arc::ptr_eq(&first, &safe.unwrap().unwrap()));

    let other = draft.unwrap().unwrap();
    assert!(other.flags.is_draft());
    assert!(!first.flags.is_draft());
    assert_eq!(cache.len(), 2);

    let keys: BTreeSet<String> = [safe.key(), draft.key()]
        .iter()
        .map(|key| format!("{key:?}"))
        .collect();
    assert_eq!(keys.len(), 2);
}
