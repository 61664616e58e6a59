use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use crate::snapshot::{RecognitionResponse, RecognitionSnapshot};

/// Función de sondeo inyectable: una petición bloqueante por tick.
/// En producción envuelve a `BackendClient::fetch_recognition`; en tests,
/// cualquier clausura.
pub type FetchFn = Box<dyn FnMut() -> Result<RecognitionResponse> + Send>;

#[derive(Debug, Clone)]
pub struct PollerParams {
    /// Período fijo entre ticks (el backend se ha sondeado entre 500 y
    /// 1000 ms según la revisión; se deja configurable)
    pub period: Duration,
}

impl Default for PollerParams {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(1000),
        }
    }
}

/// Estados del bucle de sondeo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Detenido; no se emiten más peticiones
    Idle,
    /// Esperando el próximo tick
    Polling,
    /// Petición en vuelo
    Fetching,
}

struct Shared {
    snapshot: RecognitionSnapshot,
    busy: bool,
    state: State,
}

/// Sondeador del estado de reconocimiento.
///
/// Un único hilo de trabajo emite una petición bloqueante por tick, así que
/// nunca hay dos peticiones en vuelo (política de serialización elegida
/// frente a permitir solapamiento). Cada tick lleva un número de secuencia
/// creciente y la instantánea solo aplica respuestas que no sean más viejas
/// que la última aplicada.
///
/// Ante un fallo de transporte la instantánea queda intacta y el indicador
/// de ocupado se apaga; no hay backoff, el bucle insiste al período fijo.
pub struct RecognitionPoller {
    shared: Arc<Mutex<Shared>>,
    stop_tx: Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl RecognitionPoller {
    /// Arranca el hilo de sondeo. El primer tick ocurre un período después
    /// de arrancar, igual que el `setInterval` original.
    pub fn start(params: PollerParams, fetch: FetchFn) -> Self {
        let shared = Arc::new(Mutex::new(Shared {
            snapshot: RecognitionSnapshot::default(),
            busy: false,
            state: State::Polling,
        }));

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let shared_worker = Arc::clone(&shared);

        let worker = std::thread::spawn(move || {
            poll_loop(params, fetch, shared_worker, stop_rx);
        });

        Self {
            shared,
            stop_tx,
            worker: Some(worker),
        }
    }

    /// Copia de la instantánea más reciente
    pub fn snapshot(&self) -> RecognitionSnapshot {
        self.shared.lock().unwrap().snapshot.clone()
    }

    /// ¿Hay una petición en vuelo?
    pub fn busy(&self) -> bool {
        self.shared.lock().unwrap().busy
    }

    /// Estado actual del bucle (para depuración)
    pub fn state(&self) -> &'static str {
        match self.shared.lock().unwrap().state {
            State::Idle => "IDLE",
            State::Polling => "POLLING",
            State::Fetching => "FETCHING",
        }
    }

    /// Detiene el bucle y espera a que el hilo termine. El temporizador se
    /// cancela; como mucho concluye la petición que ya estaba en vuelo.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for RecognitionPoller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn poll_loop(
    params: PollerParams,
    mut fetch: FetchFn,
    shared: Arc<Mutex<Shared>>,
    stop_rx: Receiver<()>,
) {
    let mut seq: u64 = 0;

    loop {
        // Esperar el próximo tick o la señal de parada, lo que llegue antes
        match stop_rx.recv_timeout(params.period) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        seq += 1;

        {
            let mut guard = shared.lock().unwrap();
            guard.busy = true;
            guard.state = State::Fetching;
        }

        let result = fetch();

        let mut guard = shared.lock().unwrap();
        guard.busy = false;
        guard.state = State::Polling;

        match result {
            Ok(response) => {
                // Solo se aplica si no es más vieja que la última aplicada
                guard.snapshot.apply(seq, &response);
            }
            Err(e) => {
                // Instantánea intacta: nada de parpadeos a "en blanco"
                eprintln!("⚠️  Sondeo de reconocimiento fallido (tick {}): {}", seq, e);
            }
        }
    }

    shared.lock().unwrap().state = State::Idle;
}
