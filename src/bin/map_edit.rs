use std::env;

use anyhow::{anyhow, bail, Context, Result};
use quiropanel::backend::{BackendClient, BackendConfig};
use quiropanel::mapping_store::MappingStore;
use quiropanel::types::{CollectionId, UNMAPPED};

const USAGE: &str = "Uso: map_edit [--url URL] <orden>...
  list                                muestra las tres colecciones
  options <coleccion> <tecla>         acciones legales para esa tecla
  set <coleccion> <tecla> <accion>    asigna una acción
  save                                envía las tres colecciones al backend
Colecciones: gesture | direction | motion";

enum EditOp {
    List,
    Options { collection: CollectionId, key: String },
    Set {
        collection: CollectionId,
        key: String,
        action: String,
    },
    Save,
}

struct EditOptions {
    backend: BackendConfig,
    ops: Vec<EditOp>,
}

fn parse_collection(args: &mut impl Iterator<Item = String>) -> Result<CollectionId> {
    let name = args.next().ok_or_else(|| anyhow!("{}", USAGE))?;
    CollectionId::parse(&name).ok_or_else(|| anyhow!("Colección desconocida '{}'\n{}", name, USAGE))
}

fn next_operand(args: &mut impl Iterator<Item = String>) -> Result<String> {
    args.next().ok_or_else(|| anyhow!("{}", USAGE))
}

fn parse_args() -> Result<EditOptions> {
    let mut backend = BackendConfig::default();
    let mut ops = Vec::new();
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--url" => backend.base_url = next_operand(&mut args)?,
            "list" => ops.push(EditOp::List),
            "options" => ops.push(EditOp::Options {
                collection: parse_collection(&mut args)?,
                key: next_operand(&mut args)?,
            }),
            "set" => ops.push(EditOp::Set {
                collection: parse_collection(&mut args)?,
                key: next_operand(&mut args)?,
                action: next_operand(&mut args)?,
            }),
            "save" => ops.push(EditOp::Save),
            other => bail!("Orden desconocida '{}'\n{}", other, USAGE),
        }
    }

    if ops.is_empty() {
        bail!("{}", USAGE);
    }

    Ok(EditOptions { backend, ops })
}

fn print_collections(store: &MappingStore) {
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

fn main() -> Result<()> {
    let opts = parse_args()?;
    let client = BackendClient::new(opts.backend)?;

    // Sin una carga exitosa el editor no tiene valores confirmados que
    // editar: se queda en carga en lugar de editar sobre los defaults
    let payload = client.fetch_mappings().with_context(|| {
        "⏳ Los mapeos siguen cargando: el backend no respondió y no hay nada confirmado que editar"
    })?;

    let mut store = MappingStore::new();
    store.import(&payload);
    println!("✅ Mapeos cargados desde {}", client.base_url());

    let mut edited = false;

    for op in &opts.ops {
        match op {
            EditOp::List => print_collections(&store),

            EditOp::Options { collection, key } => {
                let offered = store.available_actions(*collection, key)?;
                println!("\n🎛️  Opciones para {} / {}:", collection.display(), key);
                for (idx, action) in offered.iter().enumerate() {
                    println!("  {:>2}. {:<14} ({})", idx + 1, action.internal, action.display);
                }
            }

            EditOp::Set {
                collection,
                key,
                action,
            } => match store.set_mapping(*collection, key, action) {
                Ok(()) => {
                    edited = true;
                    println!("✅ {} / {} → {}", collection.display(), key, action);
                }
                Err(e) => println!("❌ Edición rechazada: {}", e),
            },

            EditOp::Save => {
                // Un solo cuerpo con las tres colecciones; si falla, las
                // ediciones locales no se pierden ni se revierten
                match client.update_mappings(&store.export()) {
                    Ok(ack) => println!("💾 Guardado. Respuesta del backend: {}", ack),
                    Err(e) => {
                        bail!(
                            "El guardado falló ({}); las ediciones no se enviaron. Reintenta con 'save'.",
                            e
                        );
                    }
                }
            }
        }
    }

    if edited && !opts.ops.iter().any(|op| matches!(op, EditOp::Save)) {
        println!("⚠️  Ediciones sin guardar: añade 'save' para enviarlas al backend");
    }

    Ok(())
}
