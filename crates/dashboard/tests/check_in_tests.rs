//! Check-in recorder behaviour against the in-memory record store

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gymdesk_dashboard::{CheckInError, CheckInRecorder, DEFAULT_SCAN_DELAY};
use gymdesk_database::{
    CheckIn, CheckInMethod, CreateMemberRequest, DatabaseResult, EntityKind, Member,
    MemoryBackend, RawRecord, RecordBackend, Repository,
};
use serde_json::{Map, Value};

/// Memory backend that counts create calls
#[derive(Default)]
struct CountingBackend {
    inner: MemoryBackend,
    creates: AtomicUsize,
}

#[async_trait]
impl RecordBackend for CountingBackend {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn fetch_records(&self, kind: EntityKind) -> DatabaseResult<Vec<RawRecord>> {
        self.inner.fetch_records(kind).await
    }

    async fn get_record(&self, kind: EntityKind, id: &str) -> DatabaseResult<Option<RawRecord>> {
        self.inner.get_record(kind, id).await
    }

    async fn create_record(
        &self,
        kind: EntityKind,
        fields: Map<String, Value>,
    ) -> DatabaseResult<RawRecord> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create_record(kind, fields).await
    }

    async fn update_record(
        &self,
        kind: EntityKind,
        id: &str,
        fields: Map<String, Value>,
    ) -> DatabaseResult<Option<RawRecord>> {
        self.inner.update_record(kind, id, fields).await
    }

    async fn delete_record(&self, kind: EntityKind, id: &str) -> DatabaseResult<Option<RawRecord>> {
        self.inner.delete_record(kind, id).await
    }
}

struct TestContext {
    backend: Arc<CountingBackend>,
    recorder: CheckInRecorder,
    check_ins: Repository<CheckIn>,
    members: Vec<Member>,
}

impl TestContext {
    async fn new() -> Self {
        let backend = Arc::new(CountingBackend::default());
        let members_repo = Repository::<Member>::new(backend.clone());
        let mut members = Vec::new();
        for (first, last) in [("Sarah", "Johnson"), ("Mike", "Chen"), ("Emily", "Rodriguez")] {
            let member = members_repo
                .create(CreateMemberRequest {
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    email: format!("{}@example.com", first.to_lowercase()),
                    ..Default::default()
                })
                .await
                .unwrap();
            members.push(member);
        }

        let check_ins = Repository::<CheckIn>::new(backend.clone());
        let recorder = CheckInRecorder::new(check_ins.clone());

        Self {
            backend,
            recorder,
            check_ins,
            members,
        }
    }

    fn creates(&self) -> usize {
        self.backend.creates.load(Ordering::SeqCst)
    }
}

#[tokio::test]
async fn test_manual_check_in_records_member() {
    let ctx = TestContext::new().await;
    let before = ctx.creates();
    let member = &ctx.members[1];

    let check_in = ctx
        .recorder
        .check_in_member(&format!("  {}  ", member.id), &ctx.members)
        .await
        .unwrap();

    assert_eq!(check_in.member_id, member.id);
    assert_eq!(check_in.method, CheckInMethod::Manual);
    assert_eq!(ctx.creates(), before + 1);
    assert_eq!(ctx.check_ins.get_all().await.unwrap(), vec![check_in]);
}

#[tokio::test]
async fn test_unknown_member_is_rejected_without_writing() {
    let ctx = TestContext::new().await;
    let before = ctx.creates();

    let err = ctx
        .recorder
        .check_in_member("not-a-member", &ctx.members)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckInError::MemberNotFound(ref id) if id == "not-a-member"));

    let err = ctx.recorder.check_in_member("   ", &ctx.members).await.unwrap_err();
    assert!(matches!(err, CheckInError::Validation(_)));

    assert_eq!(ctx.creates(), before);
    assert!(ctx.check_ins.get_all().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_qr_scan_checks_in_one_of_the_members() {
    let ctx = TestContext::new().await;
    assert_eq!(ctx.recorder.scan_delay(), DEFAULT_SCAN_DELAY);

    let started = tokio::time::Instant::now();
    let check_in = ctx.recorder.check_in_random(&ctx.members).await.unwrap();

    assert!(started.elapsed() >= DEFAULT_SCAN_DELAY);
    assert_eq!(check_in.method, CheckInMethod::Qr);
    assert!(ctx.members.iter().any(|m| m.id == check_in.member_id));
    assert!(!ctx.recorder.is_scanning());
}

#[tokio::test(start_paused = true)]
async fn test_scanning_flag_is_raised_for_the_duration_of_a_scan() {
    let ctx = TestContext::new().await;
    let mut scanning = ctx.recorder.subscribe_scanning();
    assert!(!*scanning.borrow());

    let (result, observed) = tokio::join!(ctx.recorder.check_in_random(&ctx.members), async {
        scanning.changed().await.unwrap();
        let during = *scanning.borrow_and_update();
        scanning.changed().await.unwrap();
        let after = *scanning.borrow_and_update();
        (during, after)
    });

    result.unwrap();
    assert_eq!(observed, (true, false));
}

#[tokio::test]
async fn test_qr_scan_with_no_members_fails_fast() {
    let ctx = TestContext::new().await;
    let before = ctx.creates();

    let err = ctx.recorder.check_in_random(&[]).await.unwrap_err();
    assert!(matches!(err, CheckInError::EmptyPool));
    assert!(!ctx.recorder.is_scanning());
    assert_eq!(ctx.creates(), before);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_scan_clears_flag_and_writes_nothing() {
    let ctx = TestContext::new().await;
    let recorder = CheckInRecorder::new(ctx.check_ins.clone())
        .with_scan_delay(Duration::from_secs(5));
    let before = ctx.creates();

    let outcome = tokio::time::timeout(
        Duration::from_secs(1),
        recorder.check_in_random(&ctx.members),
    )
    .await;

    assert!(outcome.is_err(), "scan should have been cancelled");
    assert!(!recorder.is_scanning());
    assert_eq!(ctx.creates(), before);
}
