//! Property-based tests for invoice computation.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use zing_invoice::core::*;

fn april() -> Month {
    Month::new(2014, 4).unwrap()
}

fn config() -> InvoiceConfig {
    InvoiceConfig::new("Foo", "Bar", "Baz 01234")
}

/// Rate between 0.01 and 2.00.
fn rate() -> impl Strategy<Value = Decimal> {
    (1i64..=200).prop_map(|cents| Decimal::new(cents, 2))
}

fn action() -> impl Strategy<Value = TranslationActionCode> {
    (0u8..12).prop_map(|code| TranslationActionCode::from_code(code).unwrap())
}

proptest! {
    #[test]
    fn user_amounts_sum_both_sources(
        logs in prop::collection::vec((action(), 0u32..500, 0i64..30 * 24), 0..20),
        hours in prop::collection::vec(1i64..40, 0..5),
        corrections in prop::collection::vec(-500i64..500, 0..5),
    ) {
        let ledger = InMemoryLedger::new();
        let user = User::new("member");
        let start = april().start();

        let mut translated = Decimal::ZERO;
        let mut reviewed = Decimal::ZERO;
        for (code, words, offset) in &logs {
            let when = start + Duration::hours(*offset);
            ledger.add_score_log(ScoreLog::record(&user, *code, *words, when)).unwrap();
            if code.is_paid_translation() {
                translated += Decimal::from(*words);
            } else if code.is_paid_review() {
                reviewed += Decimal::from(*words);
            }
        }
        for h in &hours {
            ledger.add_paid_task(PaidTask::new("member", PaidTaskType::HourlyWork, Decimal::from(*h), dec!(10), start)).unwrap();
        }
        for c in &corrections {
            ledger.add_paid_task(PaidTask::new("member", PaidTaskType::Correction, Decimal::from(*c), dec!(1), start)).unwrap();
        }

        let invoice = Invoice::new(&ledger, user, config()).for_month(april());
        let amounts = invoice.user_amounts("member").unwrap();

        prop_assert_eq!(amounts.translated, translated);
        prop_assert_eq!(amounts.reviewed, reviewed);
        prop_assert_eq!(amounts.hours, hours.iter().copied().map(Decimal::from).sum::<Decimal>());
        prop_assert_eq!(amounts.correction, corrections.iter().copied().map(Decimal::from).sum::<Decimal>());
    }

    #[test]
    fn recorded_rate_preferred_over_profile(recorded in rate(), profile in rate(), count in 1usize..5) {
        let ledger = InMemoryLedger::new();
        let then = User::new("member").with_rate(recorded);
        for _ in 0..count {
            ledger.add_score_log(ScoreLog::record(&then, TranslationActionCode::New, 1, april().start())).unwrap();
        }

        let now = User::new("member").with_rate(profile);
        let invoice = Invoice::new(&ledger, now, config()).for_month(april());
        prop_assert_eq!(invoice.rates().unwrap().translation, Some(recorded));
    }

    #[test]
    fn differing_hourly_rates_always_fail(a in rate(), b in rate()) {
        prop_assume!(a != b);
        let ledger = InMemoryLedger::new();
        for r in [a, b] {
            ledger.add_paid_task(PaidTask::new("member", PaidTaskType::HourlyWork, dec!(1), r, april().start())).unwrap();
        }
        let invoice = Invoice::new(&ledger, User::new("member"), config()).for_month(april());
        let is_inconsistent = matches!(
            invoice.rates(),
            Err(InvoiceError::InconsistentTaskRates { task_type: PaidTaskType::HourlyWork, .. })
        );
        prop_assert!(is_inconsistent);
    }

    #[test]
    fn generation_is_idempotent(
        words in 0u32..200,
        correction in -300i64..300,
        minimal in 0i64..100,
        runs in 1usize..4,
    ) {
        let ledger = InMemoryLedger::new();
        let user = User::new("member").with_rate(dec!(0.5));
        if words > 0 {
            ledger.add_score_log(ScoreLog::record(&user, TranslationActionCode::New, words, april().start())).unwrap();
        }
        if correction != 0 {
            ledger.add_paid_task(PaidTask::new("member", PaidTaskType::Correction, Decimal::from(correction), dec!(1), april().start())).unwrap();
        }
        let cfg = config().with_minimal_payment(Decimal::from(minimal));

        let mut first = Invoice::new(&ledger, user.clone(), cfg.clone())
            .for_month(april())
            .with_correction(true);
        let first_amounts = *first.generate().unwrap();
        let written = ledger.all_paid_tasks().unwrap().len();

        for _ in 0..runs {
            let mut again = Invoice::new(&ledger, user.clone(), cfg.clone())
                .for_month(april())
                .with_correction(true);
            prop_assert_eq!(*again.generate().unwrap(), first_amounts);
            prop_assert_eq!(ledger.all_paid_tasks().unwrap().len(), written);
        }

        // At most one pair, and only when the payment had to be deferred
        let pairs = ledger.corrections_at("member", april().end(), CARRY_OVER_TO_NEXT).unwrap();
        prop_assert!(pairs.len() <= 1);
        prop_assert_eq!(pairs.len() == 1, first_amounts.balance.is_some());
        if first_amounts.balance.is_some() {
            prop_assert_eq!(first_amounts.total, Decimal::ZERO);
        }
    }
}

#[test]
fn deferred_payment_example() {
    let ledger = InMemoryLedger::new();
    let user = User::new("member").with_rate(dec!(0.5));
    let when = Utc.with_ymd_and_hms(2014, 4, 15, 8, 0, 0).unwrap();
    for _ in 0..5 {
        ledger
            .add_score_log(ScoreLog::record(&user, TranslationActionCode::New, 5, when))
            .unwrap();
    }

    let mut invoice = Invoice::new(&ledger, user, config().with_minimal_payment(dec!(20)))
        .for_month(april())
        .with_correction(true);
    assert_eq!(invoice.calculate_amounts().unwrap().subtotal, dec!(12.5));

    let amounts = *invoice.generate().unwrap();
    assert_eq!(amounts.total, dec!(0));
    assert_eq!(amounts.balance, Some(dec!(12.5)));

    let corrections: Vec<_> = ledger
        .all_paid_tasks()
        .unwrap()
        .into_iter()
        .map(|t| t.amount)
        .collect();
    assert_eq!(corrections, vec![dec!(-12.5), dec!(12.5)]);
}
