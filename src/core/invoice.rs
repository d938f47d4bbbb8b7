use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::config::{self, InvoiceConfig};
use super::error::InvoiceError;
use super::ledger::{CARRY_OVER_FROM_PREVIOUS, CARRY_OVER_TO_NEXT, Ledger};
use super::month::{Month, previous_month};
use super::rates::resolve_rates;
use super::types::*;

/// Monthly invoice of one user.
///
/// Reads the user's score logs and paid tasks for the month from a
/// [`Ledger`], prices them and, when enabled, defers small or negative
/// payments to the following month by recording a pair of corrections.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use rust_decimal_macros::dec;
/// use zing_invoice::core::*;
///
/// let ledger = InMemoryLedger::new();
/// let user = User::new("alice").with_rate(dec!(0.1));
/// let april = Month::new(2014, 4).unwrap();
/// let at = Utc.with_ymd_and_hms(2014, 4, 3, 12, 0, 0).unwrap();
/// ledger
///     .add_score_log(ScoreLog::record(&user, TranslationActionCode::New, 250, at))
///     .unwrap();
///
/// let config = InvoiceConfig::new("Alice", "Acme Ltd", "IBAN 0000");
/// let mut invoice = Invoice::new(&ledger, user, config).for_month(april);
/// let amounts = invoice.generate().unwrap();
/// assert_eq!(amounts.total, dec!(25));
/// assert_eq!(invoice.to_string(), "<Invoice alice:2014-04>");
/// ```
pub struct Invoice<'a, L: Ledger + ?Sized> {
    ledger: &'a L,
    user: User,
    config: InvoiceConfig,
    month: Option<Month>,
    now: DateTime<Utc>,
    add_correction: bool,
    amounts: Option<Amounts>,
}

impl<'a, L: Ledger + ?Sized> Invoice<'a, L> {
    /// Invoice for the previous calendar month, without carry-over.
    pub fn new(ledger: &'a L, user: User, config: InvoiceConfig) -> Self {
        Self {
            ledger,
            user,
            config,
            month: None,
            now: Utc::now(),
            add_correction: false,
            amounts: None,
        }
    }

    /// Invoice a specific month instead of the previous one.
    pub fn for_month(mut self, month: Month) -> Self {
        self.month = Some(month);
        self
    }

    /// Whether `generate()` may record carry-over corrections.
    pub fn with_correction(mut self, add_correction: bool) -> Self {
        self.add_correction = add_correction;
        self
    }

    /// Pin the current time, which determines the default month.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn config(&self) -> &InvoiceConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// The invoiced month.
    pub fn month(&self) -> Month {
        self.month.unwrap_or_else(|| previous_month(self.now))
    }

    /// Last instant of the invoiced month.
    pub fn month_end(&self) -> DateTime<Utc> {
        self.month().end()
    }

    /// See [`config::check_config_for`].
    pub fn check_config_for(
        config: &InvoiceConfig,
        username: &str,
        require_email_fields: bool,
    ) -> Result<(), InvoiceError> {
        config::check_config_for(config, username, require_email_fields)
    }

    /// Translation, review and hourly rates for the month.
    ///
    /// Rates recorded on the month's score logs and paid tasks take
    /// precedence over the user's profile; records that disagree on a rate
    /// are an error.
    pub fn rates(&self) -> Result<Rates, InvoiceError> {
        let window = self.month().window();
        let username = self.user.username.as_str();
        let score_logs = self.ledger.score_logs(username, window.clone())?;
        let paid_tasks = self.ledger.paid_tasks(username, window)?;
        resolve_rates(&self.user, &score_logs, &paid_tasks)
    }

    /// Work recorded for `username` during the month, summing score logs and
    /// paid tasks per category.
    pub fn user_amounts(&self, username: &str) -> Result<UserAmounts, InvoiceError> {
        let window = self.month().window();

        let mut amounts = UserAmounts::default();
        for log in self.ledger.score_logs(username, window.clone())? {
            let words = Decimal::from(log.wordcount);
            if log.action_code.is_paid_translation() {
                amounts.translated += words;
            } else if log.action_code.is_paid_review() {
                amounts.reviewed += words;
            }
        }

        for task in self.ledger.paid_tasks(username, window)? {
            match task.task_type {
                PaidTaskType::Translation => amounts.translated += task.amount,
                PaidTaskType::Review => amounts.reviewed += task.amount,
                PaidTaskType::HourlyWork => amounts.hours += task.amount,
                PaidTaskType::Correction => amounts.correction += task.amount,
            }
        }

        Ok(amounts)
    }

    /// Work of the user and their subcontractors, plus, with carry-over
    /// enabled, last month's deferred balance if it never reached this month.
    pub fn full_user_amounts(&self) -> Result<UserAmounts, InvoiceError> {
        let mut amounts = self.user_amounts(&self.user.username)?;
        for subcontractor in &self.config.subcontractors {
            amounts = amounts + self.user_amounts(subcontractor)?;
        }

        if self.add_correction {
            amounts.correction += self.unapplied_carry_over()?;
        }

        Ok(amounts)
    }

    /// Amount deferred at the end of the previous month whose counterpart
    /// is missing at the start of this month.
    fn unapplied_carry_over(&self) -> Result<Decimal, InvoiceError> {
        let month = self.month();
        let username = self.user.username.as_str();
        let deferred =
            self.ledger
                .corrections_at(username, month.previous().end(), CARRY_OVER_TO_NEXT)?;
        let received =
            self.ledger
                .corrections_at(username, month.start(), CARRY_OVER_FROM_PREVIOUS)?;

        let mut pending = Decimal::ZERO;
        for entry in deferred {
            let matched = received.iter().any(|r| r.amount == -entry.amount);
            if !matched {
                pending -= entry.amount;
            }
        }
        if !pending.is_zero() {
            tracing::warn!(
                username,
                month = %month,
                amount = %pending,
                "folding in carry-over without a matching entry"
            );
        }
        Ok(pending)
    }

    /// The month's "to the next month" carry-over entry, if the full pair
    /// has been recorded.
    fn carry_over(&self) -> Result<Option<PaidTask>, InvoiceError> {
        let (to_next, from_previous) = self.carry_over_entries()?;
        Ok(to_next.filter(|t| from_previous.iter().any(|f| f.amount == -t.amount)))
    }

    fn carry_over_entries(&self) -> Result<(Option<PaidTask>, Vec<PaidTask>), InvoiceError> {
        let month = self.month();
        let username = self.user.username.as_str();
        let to_next = self
            .ledger
            .corrections_at(username, month.end(), CARRY_OVER_TO_NEXT)?
            .into_iter()
            .next();
        let from_previous =
            self.ledger
                .corrections_at(username, month.next_start(), CARRY_OVER_FROM_PREVIOUS)?;
        Ok((to_next, from_previous))
    }

    /// Whether this month's payment has already been deferred.
    pub fn is_carried_over(&self) -> Result<bool, InvoiceError> {
        Ok(self.carry_over()?.is_some())
    }

    /// Whether a payment of `subtotal` must be deferred: it is negative, or
    /// positive but below the minimal payment.
    pub fn needs_carry_over(&self, subtotal: Decimal) -> bool {
        subtotal < Decimal::ZERO
            || (subtotal > Decimal::ZERO && subtotal < self.config.minimal_payment())
    }

    /// Compute the invoice amounts from the ledger without writing anything.
    pub fn calculate_amounts(&self) -> Result<Amounts, InvoiceError> {
        let quantities = self.full_user_amounts()?;
        let rates = self.rates()?;
        let work = self.priced(&quantities, &rates).iter().sum::<Decimal>();
        let subtotal = work + quantities.correction;

        let amounts = match self.carry_over()? {
            Some(carried) => {
                let deferred = -carried.amount;
                // Work recorded after the carry-over stays payable this month.
                if !subtotal.is_zero() {
                    tracing::warn!(
                        invoice = %self,
                        remainder = %subtotal,
                        deferred = %deferred,
                        "amount left over after carry-over is paid this month"
                    );
                }
                let extra_amount = if subtotal > Decimal::ZERO {
                    self.config.extra_add()
                } else {
                    Decimal::ZERO
                };
                Amounts {
                    subtotal,
                    correction: carried.amount,
                    total: subtotal + extra_amount,
                    balance: Some(deferred),
                    extra_amount,
                }
            }
            None => {
                let extra_amount = self.config.extra_add();
                Amounts {
                    subtotal,
                    correction: quantities.correction,
                    total: subtotal + extra_amount,
                    balance: None,
                    extra_amount,
                }
            }
        };

        tracing::debug!(
            invoice = %self,
            subtotal = %amounts.subtotal,
            correction = %amounts.correction,
            total = %amounts.total,
            "calculated invoice amounts"
        );
        Ok(amounts)
    }

    /// Translation, review and hourly amounts in money.
    fn priced(&self, quantities: &UserAmounts, rates: &Rates) -> [Decimal; 3] {
        [
            ("translation", quantities.translated, rates.translation),
            ("review", quantities.reviewed, rates.review),
            ("hourly", quantities.hours, rates.hourly),
        ]
        .map(|(category, quantity, rate)| match rate {
            Some(rate) => quantity * rate,
            None => {
                if !quantity.is_zero() {
                    tracing::warn!(
                        invoice = %self,
                        category,
                        quantity = %quantity,
                        "no rate for billable work, pricing at zero"
                    );
                }
                Decimal::ZERO
            }
        })
    }

    /// Compute the amounts, deferring the payment to the next month when
    /// carry-over is enabled and needed. Safe to call repeatedly: a month
    /// is carried over at most once.
    pub fn generate(&mut self) -> Result<&Amounts, InvoiceError> {
        let mut amounts = self.calculate_amounts()?;

        if self.add_correction
            && self.needs_carry_over(amounts.subtotal)
            && self.add_carry_over(amounts.subtotal)?
        {
            amounts = self.calculate_amounts()?;
        }

        let amounts: &Amounts = self.amounts.insert(amounts);
        Ok(amounts)
    }

    /// Record the correction pair moving `subtotal` to the next month.
    /// Returns whether anything was written.
    ///
    /// A lone half already in the ledger is completed with its own amount;
    /// whatever `subtotal` then leaves over is paid by `calculate_amounts`.
    fn add_carry_over(&self, subtotal: Decimal) -> Result<bool, InvoiceError> {
        let month = self.month();
        let username = self.user.username.as_str();
        let (to_next, from_previous) = self.carry_over_entries()?;

        let to_next_half = |amount: Decimal| {
            PaidTask::new(
                username,
                PaidTaskType::Correction,
                -amount,
                Decimal::ONE,
                month.end(),
            )
            .with_description(CARRY_OVER_TO_NEXT)
        };
        let from_previous_half = |amount: Decimal| {
            PaidTask::new(
                username,
                PaidTaskType::Correction,
                amount,
                Decimal::ONE,
                month.next_start(),
            )
            .with_description(CARRY_OVER_FROM_PREVIOUS)
        };

        let (amount, tasks) = match (to_next, from_previous.first()) {
            (Some(existing), _) => {
                let amount = -existing.amount;
                if from_previous.iter().any(|f| f.amount == amount) {
                    return Ok(false);
                }
                (amount, vec![from_previous_half(amount)])
            }
            (None, Some(existing)) => (existing.amount, vec![to_next_half(existing.amount)]),
            (None, None) => (
                subtotal,
                vec![to_next_half(subtotal), from_previous_half(subtotal)],
            ),
        };

        self.ledger.insert_paid_tasks(tasks)?;
        tracing::info!(invoice = %self, amount = %amount, "carried over to the next month");
        Ok(true)
    }

    /// Amounts of the last `generate()` call.
    ///
    /// # Panics
    ///
    /// Panics if the invoice has not been generated yet.
    pub fn amounts(&self) -> &Amounts {
        match &self.amounts {
            Some(amounts) => amounts,
            None => panic!("invoice amounts read before generate()"),
        }
    }

    /// Amounts of the last `generate()` call, if any.
    pub fn try_amounts(&self) -> Option<&Amounts> {
        self.amounts.as_ref()
    }

    /// Everything a renderer needs to lay out the generated invoice.
    ///
    /// # Panics
    ///
    /// Panics if the invoice has not been generated yet.
    pub fn context(&self) -> Result<InvoiceContext, InvoiceError> {
        let amounts = *self.amounts();
        let quantities = self.full_user_amounts()?;
        let rates = self.rates()?;
        let [translation_amount, review_amount, hours_amount] = self.priced(&quantities, &rates);

        Ok(InvoiceContext {
            username: self.user.username.clone(),
            month: self.month().to_string(),
            name: self.config.name.clone(),
            paid_by: self.config.paid_by.clone(),
            wire_info: self.config.wire_info.clone(),
            email: self.config.email.clone(),
            rates,
            translated_words: quantities.translated,
            reviewed_words: quantities.reviewed,
            hours: quantities.hours,
            translation_amount,
            review_amount,
            hours_amount,
            amounts,
        })
    }
}

impl<L: Ledger + ?Sized> fmt::Display for Invoice<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Invoice {}:{}>", self.user.username, self.month())
    }
}

impl<L: Ledger + ?Sized> fmt::Debug for Invoice<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoice")
            .field("user", &self.user.username)
            .field("month", &self.month())
            .field("add_correction", &self.add_correction)
            .field("amounts", &self.amounts)
            .finish()
    }
}

/// Data handed to invoice renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceContext {
    pub username: String,
    /// Month label, `YYYY-MM`.
    pub month: String,
    pub name: Option<String>,
    pub paid_by: Option<String>,
    pub wire_info: Option<String>,
    pub email: Option<String>,
    pub rates: Rates,
    pub translated_words: Decimal,
    pub reviewed_words: Decimal,
    pub hours: Decimal,
    pub translation_amount: Decimal,
    pub review_amount: Decimal,
    pub hours_amount: Decimal,
    pub amounts: Amounts,
}
