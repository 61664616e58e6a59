use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use anyhow::{Context, Result};
use serde_json::Value;

/// Puente de diagnóstico con un proceso anfitrión: JSON delimitado por
/// líneas sobre stdin/stdout del proceso hijo. Permite un envío puntual y
/// una suscripción a los mensajes entrantes vía callback.
///
/// Solo lo usa la sonda de diagnóstico; el flujo normal del panel no pasa
/// por aquí.
pub struct HostBridge {
    process: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    callback: Option<Box<dyn FnMut(Value) + Send>>,
}

impl HostBridge {
    /// Lanza el proceso auxiliar y toma sus extremos de stdin/stdout
    pub fn spawn(program: &str, args: &[&str]) -> Result<Self> {
        let mut process = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("No se pudo lanzar el proceso puente '{}'", program))?;

        let stdin = process
            .stdin
            .take()
            .context("El proceso puente no expone stdin")?;
        let stdout = process
            .stdout
            .take()
            .context("El proceso puente no expone stdout")?;

        Ok(Self {
            process,
            stdin,
            reader: BufReader::new(stdout),
            callback: None,
        })
    }

    /// Registra el callback que recibirá cada mensaje entrante
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(Value) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Envío puntual: una línea JSON hacia el proceso anfitrión
    pub fn send(&mut self, message: &Value) -> Result<()> {
        let line = serde_json::to_string(message)?;
        writeln!(self.stdin, "{}", line).context("No se pudo escribir al proceso puente")?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Lee una línea entrante y la entrega al callback registrado.
    /// Retorna false si el proceso cerró su stdout (EOF).
    /// Las líneas que no son JSON válido se descartan con aviso.
    pub fn pump(&mut self) -> Result<bool> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .context("No se pudo leer del proceso puente")?;

        if read == 0 {
            return Ok(false);
        }

        match serde_json::from_str::<Value>(line.trim()) {
            Ok(message) => {
                if let Some(ref mut callback) = self.callback {
                    callback(message);
                }
            }
            Err(e) => {
                eprintln!("⚠️  Mensaje no-JSON del proceso puente: {}", e);
            }
        }

        Ok(true)
    }
}

impl Drop for HostBridge {
    fn drop(&mut self) {
        // Matar el proceso auxiliar al soltar el puente
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn round_trip_through_an_echo_process() {
        // `cat` devuelve línea por línea: sirve de anfitrión de eco
        let mut bridge = HostBridge::spawn("cat", &[]).unwrap();

        let received = Arc::new(Mutex::new(Vec::<Value>::new()));
        let received_cb = Arc::clone(&received);
        bridge.set_callback(move |message| {
            received_cb.lock().unwrap().push(message);
        });

        bridge.send(&json!({"msgContent": "hola", "seq": 1})).unwrap();
        assert!(bridge.pump().unwrap());

        let messages = received.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["msgContent"], "hola");
    }

    #[test]
    fn eof_reports_closed_bridge() {
        let mut bridge = HostBridge::spawn("true", &[]).unwrap();
        // `true` termina al instante sin escribir nada
        assert!(!bridge.pump().unwrap());
    }
}
