//! session — состояние "что делать со следующей приложенной картой".
//!
//! Явный конечный автомат вместо реактивного UI-холдера: pending-операция
//! (write-патч или format) взводится заранее, карта появляется позже.
//! Переходы состояния делает только сам движок по завершению транзакции
//! и явные begin_*/cancel/reset; конкурентных мутаций нет (Mutex).
//!
//! Отмена — строго до транзакции: cancel() снимает невзведённую операцию.
//! Как только handle_card забрал pending, транзакция идёт до терминального
//! исхода, точки отмены внутри нет (блочный I/O не прерывают на середине).

use std::sync::{Arc, Mutex};
use std::thread;

use log::debug;

use crate::engine::{Engine, Outcome};
use crate::record::CardRecord;
use crate::transport::CardTransport;

/// Операция, ожидающая следующей карты.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Pending {
    /// Ничего не взведено: карта будет прочитана.
    #[default]
    None,
    Write(CardRecord),
    Format,
}

/// Наблюдаемое состояние сессии (polling accessor).
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Reading,
    Writing,
    Formatting,
    Completed(Outcome),
}

struct Inner {
    pending: Pending,
    state: SessionState,
}

/// Сессия поверх движка: одна карта за раз, одна транзакция за раз.
pub struct Session {
    engine: Engine,
    inner: Mutex<Inner>,
}

impl Session {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            inner: Mutex::new(Inner {
                pending: Pending::None,
                state: SessionState::Idle,
            }),
        }
    }

    /// Взвести запись: следующая карта получит этот патч.
    pub fn begin_write(&self, patch: CardRecord) {
        let mut inner = self.inner.lock().expect("session poisoned");
        inner.pending = Pending::Write(patch);
        inner.state = SessionState::Writing;
        debug!("session: write armed");
    }

    /// Взвести формат: следующая карта будет очищена.
    pub fn begin_format(&self) {
        let mut inner = self.inner.lock().expect("session poisoned");
        inner.pending = Pending::Format;
        inner.state = SessionState::Formatting;
        debug!("session: format armed");
    }

    /// Снять невзведённую операцию (до появления карты).
    pub fn cancel(&self) {
        let mut inner = self.inner.lock().expect("session poisoned");
        inner.pending = Pending::None;
        inner.state = SessionState::Idle;
        debug!("session: pending operation cancelled");
    }

    /// Вернуть сессию в исходное состояние.
    pub fn reset(&self) {
        self.cancel();
    }

    /// Текущее состояние (снимок).
    pub fn state(&self) -> SessionState {
        self.inner.lock().expect("session poisoned").state.clone()
    }

    /// Карта приложена: забрать pending-операцию и выполнить транзакцию
    /// до терминального исхода. Pending снимается атомарно ДО начала I/O —
    /// с этого момента cancel() уже ни на что не влияет.
    pub fn handle_card(&self, transport: &mut dyn CardTransport) -> Outcome {
        let pending = {
            let mut inner = self.inner.lock().expect("session poisoned");
            let pending = std::mem::take(&mut inner.pending);
            inner.state = match pending {
                Pending::None => SessionState::Reading,
                Pending::Write(_) => SessionState::Writing,
                Pending::Format => SessionState::Formatting,
            };
            pending
        };

        let outcome = match pending {
            Pending::None => self.engine.read(transport),
            Pending::Write(patch) => self.engine.write(transport, &patch),
            Pending::Format => self.engine.format(transport),
        };

        let mut inner = self.inner.lock().expect("session poisoned");
        inner.state = SessionState::Completed(outcome.clone());
        outcome
    }

    /// То же, но на фоновом потоке: интерактивный поток не блокируется,
    /// исход доступен через JoinHandle и через state().
    pub fn dispatch<T>(self: Arc<Self>, mut transport: T) -> thread::JoinHandle<Outcome>
    where
        T: CardTransport + Send + 'static,
    {
        thread::spawn(move || self.handle_card(&mut transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VaultConfig;
    use crate::consts::BLOCK_SIZE;
    use anyhow::Result;

    /// Транспорт-заглушка: всё проходит, данные нулевые.
    #[derive(Default)]
    struct Blank {
        connected: bool,
    }

    impl CardTransport for Blank {
        fn connect(&mut self) -> Result<()> {
            self.connected = true;
            Ok(())
        }
        fn close(&mut self) -> Result<()> {
            self.connected = false;
            Ok(())
        }
        fn is_connected(&self) -> bool {
            self.connected
        }
        fn block_to_sector(&self, block: u8) -> u8 {
            block / 4
        }
        fn authenticate_sector_with_key_a(&mut self, _sector: u8, _key: &[u8; 6]) -> Result<bool> {
            Ok(true)
        }
        fn read_block(&mut self, _block: u8) -> Result<[u8; BLOCK_SIZE]> {
            Ok([0u8; BLOCK_SIZE])
        }
        fn write_block(&mut self, _block: u8, _data: &[u8; BLOCK_SIZE]) -> Result<()> {
            Ok(())
        }
    }

    fn session() -> Session {
        Session::new(Engine::new(VaultConfig::default()))
    }

    #[test]
    fn default_card_presentation_reads() {
        let s = session();
        assert_eq!(s.state(), SessionState::Idle);
        let out = s.handle_card(&mut Blank::default());
        match out {
            Outcome::Success(record) => assert!(record.is_empty()),
            Outcome::SuccessEmpty
            | Outcome::IncompatibleCard
            | Outcome::ConnectionLost
            | Outcome::Error(_) => panic!("expected read success"),
        }
        match s.state() {
            SessionState::Completed(o) => assert!(o.is_success()),
            other => panic!("expected Completed, got {:?}", other),
        }
    }

    #[test]
    fn armed_write_consumed_once() {
        let s = session();
        let mut patch = CardRecord::default();
        patch.field_one = Some("ALICE".to_string());
        s.begin_write(patch);
        assert_eq!(s.state(), SessionState::Writing);

        let out = s.handle_card(&mut Blank::default());
        assert_eq!(out, Outcome::SuccessEmpty);

        // pending снят: следующая карта снова читается
        let out = s.handle_card(&mut Blank::default());
        assert!(matches!(out, Outcome::Success(_)));
    }

    #[test]
    fn cancel_disarms_pending_format() {
        let s = session();
        s.begin_format();
        assert_eq!(s.state(), SessionState::Formatting);
        s.cancel();
        assert_eq!(s.state(), SessionState::Idle);

        let out = s.handle_card(&mut Blank::default());
        assert!(matches!(out, Outcome::Success(_)), "format must not run");
    }

    #[test]
    fn dispatch_runs_on_background_thread() {
        let s = Arc::new(session());
        s.begin_format();
        let handle = Arc::clone(&s).dispatch(Blank::default());
        let out = handle.join().expect("worker panicked");
        assert_eq!(out, Outcome::SuccessEmpty);
        assert_eq!(s.state(), SessionState::Completed(Outcome::SuccessEmpty));
    }
}
