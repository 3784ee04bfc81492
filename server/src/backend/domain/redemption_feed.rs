//! # Redemption Feed
//!
//! Admin view of today's dining hall activity.
//!
//! [`LiveFeed`] is a reducer over record events: new meal logs are prepended to a
//! short feed and counted, top-ups bump the monthly total, and student edits
//! refresh the allergy statistics. A full reload from the store
//! ([`AdminService::reconcile`]) replaces the reduced state periodically, after
//! the subscriber lags, and when the day or month rolls over.
//!
//! Every counted log and transaction id is remembered for the current day and
//! month, so an event that arrives after a reload already covering it is not
//! counted twice.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::backend::domain::commands::admin::TodayRedemptionsResult;
use crate::backend::domain::errors::DomainResult;
use crate::backend::domain::models::daily_log::DailyLog;
use crate::backend::domain::models::student::Student;
use crate::backend::storage::{
    Collection, Connection, DailyLogStorage, EventHub, Record, RecordAction, RecordEvent, StudentStorage,
    Subscription, SubscriptionError, TransactionStorage,
};

pub const TODAY_REDEMPTIONS_LIMIT: u32 = 50;
pub const LIVE_FEED_CAPACITY: usize = 10;
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(30);

const BASE_LOAD_PERCENT: u64 = 70;
const MAX_LOAD_PERCENT: u64 = 95;
const UNNAMED_STUDENT: &str = "Student";

pub type SharedLiveFeed = Arc<RwLock<LiveFeed>>;

/// One row of the live feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub log_id: String,
    pub student_name: String,
    pub time: DateTime<Utc>,
}

impl FeedEntry {
    pub fn from_log(log: &DailyLog) -> Self {
        Self {
            log_id: log.id.clone(),
            student_name: log
                .student_name
                .clone()
                .unwrap_or_else(|| UNNAMED_STUDENT.to_string()),
            time: log.created_at,
        }
    }
}

/// Full reload of everything the feed reduces
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub date: NaiveDate,
    pub month_start: DateTime<Utc>,
    /// IDs of every log dated today
    pub todays_log_ids: Vec<String>,
    /// (transaction id, amount) for every top-up since `month_start`
    pub month_transactions: Vec<(String, i64)>,
    /// (student id, allergy notes)
    pub student_allergies: Vec<(String, String)>,
    /// Today's logs, newest first
    pub recent: Vec<DailyLog>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminDashboard {
    pub date: NaiveDate,
    pub meals_served_today: u64,
    pub meals_purchased_this_month: i64,
    pub predicted_load: u8,
    /// (allergy, number of students), most common first
    pub allergy_counts: Vec<(String, usize)>,
    pub live_feed: Vec<FeedEntry>,
}

/// What applying an event did to the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedUpdate {
    Applied,
    Ignored,
    /// The event belongs to a later day or month; reload from the store
    Stale,
}

#[derive(Debug, Clone)]
pub struct LiveFeed {
    date: NaiveDate,
    month_start: DateTime<Utc>,
    meals_purchased_this_month: i64,
    todays_log_ids: HashSet<String>,
    month_transaction_ids: HashSet<String>,
    student_allergies: HashMap<String, String>,
    entries: VecDeque<FeedEntry>,
}

impl LiveFeed {
    /// Empty feed for the day containing `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            date: now.date_naive(),
            month_start: month_start(now),
            meals_purchased_this_month: 0,
            todays_log_ids: HashSet::new(),
            month_transaction_ids: HashSet::new(),
            student_allergies: HashMap::new(),
            entries: VecDeque::with_capacity(LIVE_FEED_CAPACITY),
        }
    }

    pub fn shared(now: DateTime<Utc>) -> SharedLiveFeed {
        Arc::new(RwLock::new(Self::new(now)))
    }

    pub fn apply(&mut self, event: &RecordEvent) -> FeedUpdate {
        match (&event.action, &event.record) {
            (RecordAction::Created, Record::DailyLog(log)) => self.apply_log(log),
            (RecordAction::Created, Record::Transaction(transaction)) => {
                if transaction.date < self.month_start {
                    return FeedUpdate::Ignored;
                }
                if month_start(transaction.date) != self.month_start {
                    return FeedUpdate::Stale;
                }
                if !self.month_transaction_ids.insert(transaction.id.clone()) {
                    debug!("Skipping already counted transaction {}", transaction.id);
                    return FeedUpdate::Ignored;
                }
                self.meals_purchased_this_month += transaction.amount;
                FeedUpdate::Applied
            }
            (_, Record::Student(student)) => self.apply_student(student),
            _ => FeedUpdate::Ignored,
        }
    }

    fn apply_log(&mut self, log: &DailyLog) -> FeedUpdate {
        if log.date < self.date {
            return FeedUpdate::Ignored;
        }
        if log.date > self.date {
            return FeedUpdate::Stale;
        }
        if !self.todays_log_ids.insert(log.id.clone()) {
            debug!("Skipping already counted log {}", log.id);
            return FeedUpdate::Ignored;
        }

        self.entries.push_front(FeedEntry::from_log(log));
        self.entries.truncate(LIVE_FEED_CAPACITY);
        FeedUpdate::Applied
    }

    fn apply_student(&mut self, student: &Student) -> FeedUpdate {
        let previous = self
            .student_allergies
            .insert(student.id.clone(), student.allergies.clone());
        if previous.as_deref() == Some(student.allergies.as_str()) {
            FeedUpdate::Ignored
        } else {
            FeedUpdate::Applied
        }
    }

    /// Replace all reduced state with a fresh reload
    pub fn reconcile(&mut self, snapshot: FeedSnapshot) {
        self.date = snapshot.date;
        self.month_start = snapshot.month_start;
        self.todays_log_ids = snapshot.todays_log_ids.into_iter().collect();
        self.meals_purchased_this_month = snapshot.month_transactions.iter().map(|(_, amount)| amount).sum();
        self.month_transaction_ids = snapshot.month_transactions.into_iter().map(|(id, _)| id).collect();
        self.student_allergies = snapshot.student_allergies.into_iter().collect();
        self.entries = snapshot
            .recent
            .iter()
            .take(LIVE_FEED_CAPACITY)
            .map(FeedEntry::from_log)
            .collect();
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn entries(&self) -> Vec<FeedEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn meals_served_today(&self) -> u64 {
        self.todays_log_ids.len() as u64
    }

    pub fn predicted_load(&self) -> u8 {
        predicted_load(self.meals_served_today())
    }

    pub fn dashboard(&self) -> AdminDashboard {
        AdminDashboard {
            date: self.date,
            meals_served_today: self.meals_served_today(),
            meals_purchased_this_month: self.meals_purchased_this_month,
            predicted_load: self.predicted_load(),
            allergy_counts: allergy_counts(self.student_allergies.values().map(String::as_str)),
            live_feed: self.entries(),
        }
    }
}

/// Expected dining hall load in percent: 70 plus one point per two meals, capped at 95
pub fn predicted_load(meals_served: u64) -> u8 {
    (BASE_LOAD_PERCENT + meals_served / 2).min(MAX_LOAD_PERCENT) as u8
}

/// Split free-text allergy notes on commas, Arabic commas and whitespace
pub fn parse_allergies(notes: &str) -> Vec<String> {
    notes
        .split(|c: char| c == ',' || c == '\u{060C}' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Number of students listing each allergy, most common first
pub fn allergy_counts<'a>(notes: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for student_notes in notes {
        let unique: HashSet<String> = parse_allergies(student_notes).into_iter().collect();
        for allergy in unique {
            *counts.entry(allergy).or_insert(0) += 1;
        }
    }

    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Midnight UTC on the first day of the month containing `now`
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

#[derive(Clone)]
pub struct AdminService<C: Connection> {
    student_repository: C::StudentRepository,
    daily_log_repository: C::DailyLogRepository,
    transaction_repository: C::TransactionRepository,
    events: EventHub,
}

impl<C: Connection> AdminService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            daily_log_repository: connection.create_daily_log_repository(),
            transaction_repository: connection.create_transaction_repository(),
            events: connection.events().clone(),
        }
    }

    /// Today's meal logs with student names, newest first
    pub async fn todays_redemptions(&self, limit: Option<u32>) -> DomainResult<TodayRedemptionsResult> {
        let date = Utc::now().date_naive();
        let limit = limit.unwrap_or(TODAY_REDEMPTIONS_LIMIT);
        let redemptions = self.daily_log_repository.list_for_date(date, limit).await?;
        Ok(TodayRedemptionsResult { date, redemptions })
    }

    pub async fn load_snapshot(&self, now: DateTime<Utc>) -> DomainResult<FeedSnapshot> {
        let date = now.date_naive();
        let month_start = month_start(now);

        let todays_log_ids = self.daily_log_repository.list_ids_for_date(date).await?;
        let month_transactions = self
            .transaction_repository
            .list_since(month_start)
            .await?
            .into_iter()
            .map(|transaction| (transaction.id, transaction.amount))
            .collect();
        let student_allergies = self
            .student_repository
            .list_students()
            .await?
            .into_iter()
            .map(|student| (student.id, student.allergies))
            .collect();
        let recent = self
            .daily_log_repository
            .list_for_date(date, LIVE_FEED_CAPACITY as u32)
            .await?;

        Ok(FeedSnapshot {
            date,
            month_start,
            todays_log_ids,
            month_transactions,
            student_allergies,
            recent,
        })
    }

    /// Reload the feed from the store
    pub async fn reconcile(&self, feed: &SharedLiveFeed) -> DomainResult<()> {
        let snapshot = self.load_snapshot(Utc::now()).await?;
        feed.write().await.reconcile(snapshot);
        Ok(())
    }

    pub async fn dashboard(&self, feed: &SharedLiveFeed) -> AdminDashboard {
        feed.read().await.dashboard()
    }

    /// Meal log events only, for streaming to admin screens
    pub fn subscribe_redemptions(&self) -> Subscription {
        self.events.subscribe(Collection::DailyLogs)
    }

    pub fn subscribe_all(&self) -> Subscription {
        self.events.subscribe_all()
    }
}

/// Keep `feed` current until the event hub closes.
///
/// Events are applied as they arrive. The feed is reloaded on start, every
/// `reconcile_every`, after a lag and on day or month rollover.
pub async fn run_live_feed<C: Connection>(
    service: AdminService<C>,
    feed: SharedLiveFeed,
    reconcile_every: Duration,
) {
    let mut subscription = service.subscribe_all();
    let mut ticker = tokio::time::interval(reconcile_every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!("Live feed started (reconcile every {:?})", reconcile_every);

    loop {
        let reload = tokio::select! {
            _ = ticker.tick() => true,
            received = subscription.recv() => match received {
                Ok(event) => feed.write().await.apply(&event) == FeedUpdate::Stale,
                Err(SubscriptionError::Lagged(skipped)) => {
                    warn!("Live feed lagged, skipped {} events", skipped);
                    true
                }
                Err(SubscriptionError::Closed) => break,
            },
        };

        if reload {
            if let Err(e) = service.reconcile(&feed).await {
                error!("Live feed reconcile failed: {}", e);
            }
        }
    }

    info!("Live feed stopped");
}
