//! End-to-end behaviour of the installed panic hook and the primary recovery loop.
//!
//! The panic hook is process-wide, so every test takes the `serial()` lock and
//! uninstalls its supervisor when done.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use faultvisor::{
    ContextId, DispatchHandle, DispatchQueue, Event, EventKind, FsStorage, ReportError, Storage, Subscribe,
    Supervisor, SupervisorBuilder, SupervisorConfig, SupervisorError,
};

const TIMEOUT: Duration = Duration::from_secs(10);

static SERIAL: Mutex<()> = Mutex::new(());

/// Holds the global test lock and uninstalls the supervisor on drop.
struct Serial {
    _lock: MutexGuard<'static, ()>,
}

impl Drop for Serial {
    fn drop(&mut self) {
        Supervisor::uninstall();
    }
}

fn serial() -> Serial {
    Serial {
        _lock: SERIAL.lock().unwrap_or_else(PoisonError::into_inner),
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<Event>>);

impl Recorder {
    fn count(&self, kind: EventKind) -> usize {
        self.events().iter().filter(|e| e.kind == kind).count()
    }

    fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(|e| e.kind).collect()
    }

    fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Subscribe for Recorder {
    fn on_event(&self, event: &Event) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

/// In-memory storage; optionally fails every write.
#[derive(Default)]
struct MemoryStorage {
    writes: Mutex<Vec<(PathBuf, String)>>,
    fail: bool,
}

impl MemoryStorage {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Storage for MemoryStorage {
    fn is_available(&self) -> bool {
        true
    }

    fn resolve_dir(&self) -> Result<PathBuf, ReportError> {
        Ok(PathBuf::from("/mem"))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
        if self.fail {
            return Err(ReportError::Write {
                path: path.to_path_buf(),
                source: io::Error::other("read-only file system"),
            });
        }
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((path.to_path_buf(), String::from_utf8_lossy(bytes).into_owned()));
        Ok(())
    }
}

/// A dispatch loop running under the recovery loop on its own "primary" thread.
struct Primary {
    work: DispatchHandle,
    thread: JoinHandle<Result<(), SupervisorError>>,
}

impl Primary {
    /// Installs the supervisor on a fresh thread and runs the queue there.
    fn spawn<F>(configure: F) -> Self
    where
        F: FnOnce() -> SupervisorBuilder + Send + 'static,
    {
        let queue = DispatchQueue::new();
        let work = queue.handle();
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("primary".into())
            .spawn(move || {
                let sup = configure().install();
                ready_tx.send(()).unwrap();
                sup.run_primary(&queue)
            })
            .unwrap();
        ready_rx.recv_timeout(TIMEOUT).unwrap();

        Self { work, thread }
    }

    /// Submits a job and waits until the loop has run it.
    fn roundtrip(&self) -> bool {
        let (tx, rx) = mpsc::channel();
        self.work.submit(move || tx.send(()).unwrap()).unwrap();
        rx.recv_timeout(TIMEOUT).is_ok()
    }

    fn raise(&self, msg: &'static str) {
        self.work.submit(move || panic!("{msg}")).unwrap();
    }

    fn stop(self) -> thread::Result<Result<(), SupervisorError>> {
        self.work.quit().unwrap();
        self.thread.join()
    }
}

fn builder(recorder: &Arc<Recorder>, storage: Arc<dyn Storage>) -> SupervisorBuilder {
    Supervisor::builder(SupervisorConfig::default())
        .capture_backtrace(false)
        .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .with_storage(storage)
}

fn artifacts(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

/// `crashErrorInfo\d{4}-\d{2}-\d{2}-\d{2}-\d{2}-\d{2}\.txt`
fn is_artifact_name(name: &str) -> bool {
    let Some(stamp) = name
        .strip_prefix("crashErrorInfo")
        .and_then(|rest| rest.strip_suffix(".txt"))
    else {
        return false;
    };
    stamp.len() == 19
        && stamp.char_indices().all(|(i, c)| match i {
            4 | 7 | 10 | 13 | 16 => c == '-',
            _ => c.is_ascii_digit(),
        })
}

#[test]
fn primary_boom_is_reported_and_loop_keeps_working() {
    let _serial = serial();
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("cache");
    let storage = Arc::new(FsStorage::new(&dir));
    let recorder = Arc::new(Recorder::default());

    let rec = Arc::clone(&recorder);
    let primary = Primary::spawn(move || {
        builder(&rec, storage)
            .persist_faults(true)
            .recover_primary_context(true)
            .capture_backtrace(true)
    });

    primary.raise("boom");
    assert!(primary.roundtrip(), "primary loop stopped accepting work");

    let files = artifacts(&dir);
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_str().unwrap();
    assert!(is_artifact_name(name), "unexpected artifact name {name}");
    let body = fs::read_to_string(&files[0]).unwrap();
    assert!(body.contains("boom"));
    assert!(body.contains("'primary'"));

    assert_eq!(recorder.count(EventKind::RecoveryScheduled), 1);
    assert_eq!(recorder.count(EventKind::DispatchResuming), 1);
    assert_eq!(recorder.count(EventKind::FaultPropagated), 0);

    assert!(matches!(primary.stop(), Ok(Ok(()))));
    assert_eq!(recorder.count(EventKind::DispatchStopped), 1);
}

#[test]
fn per_fault_order_is_log_then_persist_then_recover() {
    let _serial = serial();
    let storage = Arc::new(MemoryStorage::default());
    let recorder = Arc::new(Recorder::default());

    let (rec, store) = (Arc::clone(&recorder), storage.clone());
    let primary = Primary::spawn(move || builder(&rec, store));
    primary.raise("ordered");
    assert!(primary.roundtrip());
    primary.stop().unwrap().unwrap();

    let kinds = recorder.kinds();
    let at = kinds
        .iter()
        .position(|k| *k == EventKind::FaultIntercepted)
        .unwrap();
    assert_eq!(
        kinds[at..at + 5],
        [
            EventKind::FaultIntercepted,
            EventKind::ReportWritten,
            EventKind::RecoveryScheduled,
            EventKind::DispatchFaulted,
            EventKind::DispatchResuming,
        ]
    );
    let seqs: Vec<u64> = recorder.events().iter().map(|e| e.seq).collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn secondary_fault_is_reported_and_thread_still_dies() {
    let _serial = serial();
    let storage = Arc::new(MemoryStorage::default());
    let recorder = Arc::new(Recorder::default());
    builder(&recorder, storage.clone()).install();

    let worker = thread::Builder::new()
        .name("worker".into())
        .spawn(|| panic!("worker failed"))
        .unwrap();
    assert!(worker.join().is_err(), "secondary context must terminate");

    let writes = storage.writes();
    assert_eq!(writes.len(), 1);
    assert!(writes[0].1.contains("worker failed"));
    assert!(writes[0].1.contains("'worker'"));

    assert_eq!(recorder.count(EventKind::FaultPropagated), 1);
    assert_eq!(recorder.count(EventKind::RecoveryScheduled), 0);
    assert_eq!(recorder.count(EventKind::DispatchResuming), 0);
}

#[test]
fn primary_fault_without_recovery_kills_the_primary() {
    let _serial = serial();
    let storage = Arc::new(MemoryStorage::default());
    let recorder = Arc::new(Recorder::default());

    let (rec, store) = (Arc::clone(&recorder), storage.clone());
    let primary = Primary::spawn(move || builder(&rec, store).recover_primary_context(false));
    primary.raise("fatal");

    let Primary { thread, .. } = primary;
    let payload = thread.join().unwrap_err();
    let msg = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied());
    assert_eq!(msg, Some("fatal"));

    assert_eq!(storage.writes().len(), 1);
    assert_eq!(recorder.count(EventKind::FaultPropagated), 1);
    assert_eq!(recorder.count(EventKind::DispatchResuming), 0);
    assert_eq!(recorder.count(EventKind::DispatchStopped), 0);
}

#[test]
fn repeated_primary_faults_each_get_one_report() {
    const N: usize = 5;
    let _serial = serial();
    let storage = Arc::new(MemoryStorage::default());
    let recorder = Arc::new(Recorder::default());

    let (rec, store) = (Arc::clone(&recorder), storage.clone());
    let primary = Primary::spawn(move || builder(&rec, store));
    for _ in 0..N {
        primary.raise("again");
    }
    assert!(primary.roundtrip());

    assert_eq!(storage.writes().len(), N);
    assert_eq!(recorder.count(EventKind::ReportWritten), N);
    assert_eq!(recorder.count(EventKind::DispatchFaulted), N);

    let last = recorder
        .events()
        .into_iter()
        .filter(|e| e.kind == EventKind::DispatchResuming)
        .last()
        .unwrap();
    assert_eq!(last.attempt, Some(N as u32));
    assert!(matches!(primary.stop(), Ok(Ok(()))));
}

#[test]
fn disabled_persistence_writes_nothing() {
    let _serial = serial();
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("cache");
    let storage = Arc::new(FsStorage::new(&dir));
    let recorder = Arc::new(Recorder::default());

    let rec = Arc::clone(&recorder);
    let primary = Primary::spawn(move || builder(&rec, storage).persist_faults(false));
    for _ in 0..3 {
        primary.raise("unsaved");
    }
    assert!(primary.roundtrip());
    primary.stop().unwrap().unwrap();

    assert!(artifacts(&dir).is_empty());
    assert_eq!(recorder.count(EventKind::FaultIntercepted), 3);
    assert!(recorder.events().iter().all(|e| !e.is_report_outcome()));
}

#[test]
fn storage_failure_does_not_block_recovery() {
    let _serial = serial();
    let storage = Arc::new(MemoryStorage::failing());
    let recorder = Arc::new(Recorder::default());

    let (rec, store) = (Arc::clone(&recorder), storage.clone());
    let primary = Primary::spawn(move || builder(&rec, store));
    primary.raise("disk full");
    assert!(primary.roundtrip(), "reporting fault must not stop recovery");

    assert_eq!(recorder.count(EventKind::ReportFailed), 1);
    assert_eq!(recorder.count(EventKind::DispatchResuming), 1);
    let failed = recorder
        .events()
        .into_iter()
        .find(|e| e.kind == EventKind::ReportFailed)
        .unwrap();
    assert!(failed.reason.unwrap().contains("read-only file system"));
    primary.stop().unwrap().unwrap();
}

#[test]
fn second_install_replaces_the_first() {
    let _serial = serial();
    let first_storage = Arc::new(MemoryStorage::default());
    let second_storage = Arc::new(MemoryStorage::default());
    let first = Arc::new(Recorder::default());
    let second = Arc::new(Recorder::default());

    let a = builder(&first, first_storage.clone()).install();
    let b = builder(&second, second_storage.clone())
        .persist_faults(false)
        .install();

    assert!(!a.is_active());
    assert!(b.is_active());
    assert!(Arc::ptr_eq(&Supervisor::current().unwrap(), &b));

    let worker = thread::spawn(|| panic!("after reinstall"));
    assert!(worker.join().is_err());

    assert_eq!(first.count(EventKind::FaultIntercepted), 0);
    assert_eq!(second.count(EventKind::FaultIntercepted), 1);
    assert!(first_storage.writes().is_empty());
    assert!(second_storage.writes().is_empty());
}

#[test]
fn reinstall_from_a_worker_keeps_the_primary_recovering() {
    let _serial = serial();
    let first = Arc::new(Recorder::default());
    let second = Arc::new(Recorder::default());

    let rec = Arc::clone(&first);
    let primary = Primary::spawn(move || builder(&rec, Arc::new(MemoryStorage::default())));
    let primary_id = ContextId::of(primary.thread.thread());

    // Installed from the test thread while the primary loop is running.
    let replacement = builder(&second, Arc::new(MemoryStorage::default())).install();
    assert_eq!(replacement.primary(), primary_id);

    primary.raise("boom");
    assert!(primary.roundtrip(), "primary context died after a reinstall");

    assert_eq!(second.count(EventKind::RecoveryScheduled), 1);
    assert_eq!(second.count(EventKind::FaultPropagated), 0);
    assert_eq!(first.count(EventKind::DispatchResuming), 1);
    assert!(matches!(primary.stop(), Ok(Ok(()))));
}

#[test]
fn explicit_primary_elsewhere_does_not_stop_a_running_loop() {
    let _serial = serial();
    let recorder = Arc::new(Recorder::default());
    let primary = Primary::spawn(|| {
        builder(
            &Arc::new(Recorder::default()),
            Arc::new(MemoryStorage::default()),
        )
    });

    builder(&recorder, Arc::new(MemoryStorage::default()))
        .with_primary(ContextId::current())
        .install();

    primary.raise("boom");
    assert!(primary.roundtrip(), "running loop must keep recovering");
    assert_eq!(recorder.count(EventKind::RecoveryScheduled), 1);
    assert!(matches!(primary.stop(), Ok(Ok(()))));
}

#[test]
fn reconfigure_chains_onto_installed_settings() {
    let _serial = serial();
    let storage = Arc::new(MemoryStorage::default());
    let recorder = Arc::new(Recorder::default());

    let original = builder(&recorder, storage.clone()).install();
    let updated = original.reconfigure().persist_faults(false).install();

    assert!(updated.is_active());
    assert_eq!(updated.primary(), original.primary());
    assert!(!updated.config().persist_faults);

    let worker = thread::spawn(|| panic!("quiet"));
    assert!(worker.join().is_err());

    assert!(storage.writes().is_empty());
    assert_eq!(recorder.count(EventKind::FaultIntercepted), 1);
}

#[test]
fn uninstalled_supervisor_sees_nothing() {
    let _serial = serial();
    let storage = Arc::new(MemoryStorage::default());
    let recorder = Arc::new(Recorder::default());
    builder(&recorder, storage.clone()).install();

    assert!(Supervisor::uninstall().is_some());
    assert!(Supervisor::current().is_none());

    let worker = thread::spawn(|| panic!("unsupervised"));
    assert!(worker.join().is_err());

    assert_eq!(recorder.count(EventKind::FaultIntercepted), 0);
    assert!(storage.writes().is_empty());
}
