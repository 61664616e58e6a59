/*
Panel de control del controlador multimedia por gestos

El panel:
1. Consulta la configuración y los mapeos al backend HTTP y los muestra
2. Sondea el endpoint de reconocimiento a período fijo
3. Mantiene una instantánea estable (los campos ausentes retienen su último
   valor conocido) y la imprime cada vez que cambia

El backend (captura de vídeo + reconocimiento + ejecución de acciones) corre
aparte; por defecto se asume en http://localhost:5000.

Para compilar y ejecutar:
    ./target/release/quiropanel [url-base] [--period-ms N] [--get] [--bridge CMD]

Comandos en vivo:
    m                          → imprime los mapeos actuales
    s                          → imprime la instantánea y el estado del sondeador
    c <cám> <HSV|YcRcb> <ratio> → reenvía la configuración de captura al backend
    q                          → salir
*/

use std::io::BufRead;
use std::time::Duration;

use anyhow::{bail, Result};
use crossbeam_channel::{select, tick, unbounded};

use quiropanel::backend::{BackendClient, BackendConfig, RecognitionMethod};
use quiropanel::bridge::HostBridge;
use quiropanel::mapping_store::MappingStore;
use quiropanel::recognition_poller::{PollerParams, RecognitionPoller};
use quiropanel::settings::{CameraSettings, ColorMode};
use quiropanel::snapshot::RecognitionSnapshot;
use quiropanel::types::{CollectionId, UNMAPPED};

struct PanelOptions {
    backend: BackendConfig,
    poller: PollerParams,
    bridge_program: Option<String>,
}

fn parse_args() -> Result<PanelOptions> {
    let mut backend = BackendConfig::default();
    let mut poller = PollerParams::default();
    let mut bridge_program = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--get" => backend.recognition_method = RecognitionMethod::Get,
            "--period-ms" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--period-ms requiere un valor"))?;
                poller.period = Duration::from_millis(value.parse()?);
            }
            "--bridge" => {
                bridge_program = Some(
                    args.next()
                        .ok_or_else(|| anyhow::anyhow!("--bridge requiere un comando"))?,
                );
            }
            other if !other.starts_with('-') => backend.base_url = other.to_string(),
            other => {
                bail!(
                    "Argumento desconocido '{}'. Uso: quiropanel [url-base] [--period-ms N] [--get] [--bridge CMD]",
                    other
                );
            }
        }
    }

    Ok(PanelOptions {
        backend,
        poller,
        bridge_program,
    })
}

fn print_mappings(store: &MappingStore) {
    if !store.is_ready() {
        // Sin carga exitosa no hay valores confirmados que mostrar
        println!("⏳ Cargando mapeos del backend...");
        return;
    }

    for collection in CollectionId::ALL {
        println!("\n🖐  {}:", collection.display());
        for key in collection.keys() {
            let action = store.get(collection, key).unwrap_or(UNMAPPED);
            println!(
                "  {:<12} → {:<14} ({})",
                key,
                action,
                collection.action_display(action)
            );
        }
    }
    println!();
}

fn render_snapshot(snapshot: &RecognitionSnapshot) -> String {
    format!(
        "🖐  Gesto: {} | Dedo: {} | Movimiento: {} (último: {})",
        snapshot.gesture, snapshot.direction, snapshot.motion_detected, snapshot.motion_last_detected
    )
}

/// Interpreta "c <cámara> <HSV|YcRcb> <ratio>" y reenvía la configuración
fn submit_settings(client: &BackendClient, operands: &[&str]) {
    let parsed = match operands {
        [camera, mode, ratio] => {
            let color_mode = match *mode {
                "HSV" => Some(ColorMode::Hsv),
                "YcRcb" => Some(ColorMode::YcRcb),
                _ => None,
            };
            match (camera.parse(), color_mode, ratio.parse()) {
                (Ok(camera), Some(color_mode), Ok(bounded_ratio)) => Some(CameraSettings {
                    camera,
                    color_mode,
                    bounded_ratio,
                }),
                _ => None,
            }
        }
        _ => None,
    };

    let settings = match parsed {
        Some(settings) => settings,
        None => {
            println!("⚠️  Uso: c <cámara> <HSV|YcRcb> <ratio>");
            return;
        }
    };

    if let Err(e) = settings.validate() {
        println!("❌ Configuración inválida: {}", e);
        return;
    }

    match client.update_settings(&settings) {
        Ok(ack) => println!("⚙️  Configuración enviada. Respuesta: {}", ack),
        Err(e) => eprintln!("❌ No se pudo enviar la configuración: {}", e),
    }
}

/// Sonda puntual del puente con el proceso anfitrión: un mensaje de ida,
/// una respuesta de vuelta, y se cierra
fn run_bridge_probe(program: &str) -> Result<()> {
    println!("🔗 Sonda del puente anfitrión: {}", program);

    let mut bridge = HostBridge::spawn(program, &[])?;
    bridge.set_callback(|message| {
        println!("📨 Respuesta del anfitrión: {}", message);
    });

    bridge.send(&serde_json::json!({ "msgContent": "ping desde quiropanel" }))?;
    if !bridge.pump()? {
        println!("⚠️  El proceso anfitrión cerró sin responder");
    }

    Ok(())
}

fn main() -> Result<()> {
    println!("🎛️  Quiropanel - Control Multimedia por Gestos\n");

    let opts = parse_args()?;
    println!("🎯 Backend: {}", opts.backend.base_url);
    println!("⏱️  Período de sondeo: {} ms\n", opts.poller.period.as_millis());

    let client = BackendClient::new(opts.backend.clone())?;

    if let Some(ref program) = opts.bridge_program {
        if let Err(e) = run_bridge_probe(program) {
            eprintln!("❌ Sonda del puente fallida: {}", e);
        }
    }

    // Despertar al backend (el "Start Feed" original)
    match client.warm_up() {
        Ok(()) => println!("✅ Backend despierto"),
        Err(e) => eprintln!("⚠️  El backend no respondió al arranque: {}", e),
    }

    println!("📹 Stream de vídeo en: {}", client.video_feed_url());

    match client.fetch_settings() {
        Ok(settings) => println!(
            "⚙️  Cámara {} | Modo {:?} | Ratio {:.2}",
            settings.camera, settings.color_mode, settings.bounded_ratio
        ),
        Err(e) => eprintln!("⚠️  Configuración no disponible: {}", e),
    }

    // Carga de mapeos: si falla, el almacén se queda visiblemente en carga
    // (los valores por defecto nunca se presentan como verdad confirmada)
    let mut store = MappingStore::new();
    match client.fetch_mappings() {
        Ok(payload) => {
            store.import(&payload);
            println!("✅ Mapeos cargados");
        }
        Err(e) => eprintln!("⚠️  Mapeos no disponibles, reintenta con 'm': {}", e),
    }
    print_mappings(&store);

    // El sondeador usa su propio cliente: vive en otro hilo
    let poller_client = BackendClient::new(opts.backend.clone())?;
    let poller = RecognitionPoller::start(
        opts.poller.clone(),
        Box::new(move || poller_client.fetch_recognition().map_err(Into::into)),
    );
    println!("🎬 Sondeo de reconocimiento iniciado\n");

    // Hilo lector de stdin → canal, para poder mezclarlo con el ticker
    let (tx_input, rx_input) = unbounded::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(text) => {
                    if tx_input.send(text).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let ticker = tick(Duration::from_millis(250));
    let mut last_shown = String::new();

    loop {
        select! {
            recv(ticker) -> _ => {
                let rendered = render_snapshot(&poller.snapshot());
                if rendered != last_shown {
                    println!("{}", rendered);
                    last_shown = rendered;
                }
            }
            recv(rx_input) -> line => {
                match line {
                    Ok(command) => match command.trim() {
                        "q" => break,
                        "m" => {
                            // Reintento de carga si seguimos sin datos confirmados
                            if !store.is_ready() {
                                if let Ok(payload) = client.fetch_mappings() {
                                    store.import(&payload);
                                    println!("✅ Mapeos cargados");
                                }
                            }
                            print_mappings(&store);
                        }
                        "s" => {
                            println!("{}", render_snapshot(&poller.snapshot()));
                            println!(
                                "🔄 Estado: {} | ocupado: {} | tick aplicado: {}",
                                poller.state(),
                                poller.busy(),
                                poller.snapshot().last_applied_seq()
                            );
                        }
                        "" => {}
                        other if other == "c" || other.starts_with("c ") => {
                            let operands: Vec<&str> = other.split_whitespace().skip(1).collect();
                            submit_settings(&client, &operands);
                        }
                        other => println!("⚠️  Comando desconocido: '{}'", other),
                    },
                    Err(_) => break, // stdin cerrado
                }
            }
        }
    }

    poller.stop();
    println!("\n👋 Saliendo...");
    Ok(())
}
