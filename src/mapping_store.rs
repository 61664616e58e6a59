use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Action, CollectionId, UNMAPPED};

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("La configuración de mapeos todavía no se ha cargado")]
    NotLoaded,

    #[error("Tecla desconocida '{key}' en la colección {collection:?}")]
    UnknownKey {
        collection: CollectionId,
        key: String,
    },

    #[error("Acción '{action}' no disponible para '{key}' en {collection:?}")]
    UnavailableAction {
        collection: CollectionId,
        key: String,
        action: String,
    },
}

/// Cuerpo JSON con las tres colecciones, tal como lo sirve y recibe el backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingsPayload {
    #[serde(rename = "gestureMappings", default)]
    pub gesture_mappings: BTreeMap<String, String>,
    #[serde(rename = "directionMappings", default)]
    pub direction_mappings: BTreeMap<String, String>,
    #[serde(rename = "motionMappings", default)]
    pub motion_mappings: BTreeMap<String, String>,
}

impl MappingsPayload {
    fn collection(&self, id: CollectionId) -> &BTreeMap<String, String> {
        match id {
            CollectionId::Gesture => &self.gesture_mappings,
            CollectionId::Direction => &self.direction_mappings,
            CollectionId::Motion => &self.motion_mappings,
        }
    }

    fn collection_mut(&mut self, id: CollectionId) -> &mut BTreeMap<String, String> {
        match id {
            CollectionId::Gesture => &mut self.gesture_mappings,
            CollectionId::Direction => &mut self.direction_mappings,
            CollectionId::Motion => &mut self.motion_mappings,
        }
    }
}

/// Estado de carga del almacén. Hasta que no llega un payload válido del
/// backend, los valores por defecto NO se presentan como verdad confirmada
/// y ninguna edición se acepta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
}

/// Almacén de los tres mapeos tecla → acción con unicidad por colección.
///
/// Invariante: dentro de una colección, una acción distinta de `unmapped`
/// está asignada a lo sumo a una tecla. El invariante se sostiene por
/// construcción: `available_actions` nunca ofrece una acción reclamada por
/// otra tecla, y `set_mapping` rechaza todo lo que no esté ofrecido.
pub struct MappingStore {
    state: LoadState,
    collections: [BTreeMap<&'static str, String>; 3],
}

impl MappingStore {
    pub fn new() -> Self {
        let collections = CollectionId::ALL.map(|id| {
            id.keys()
                .iter()
                .map(|key| (*key, UNMAPPED.to_string()))
                .collect()
        });

        Self {
            state: LoadState::Loading,
            collections,
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    /// Importa un payload del backend y marca el almacén como listo.
    ///
    /// Tolerante con datos imperfectos: teclas desconocidas se ignoran,
    /// teclas ausentes quedan en `unmapped`, acciones fuera de catálogo se
    /// normalizan a `unmapped`, y si el payload trae una acción duplicada
    /// dentro de una colección solo la primera tecla (en orden de catálogo)
    /// la conserva.
    pub fn import(&mut self, payload: &MappingsPayload) {
        for id in CollectionId::ALL {
            let source = payload.collection(id);
            let target = &mut self.collections[id.index()];
            let mut claimed: Vec<&str> = Vec::new();

            for key in id.keys() {
                let incoming = source.get(*key).map(String::as_str).unwrap_or(UNMAPPED);

                let normalized = if incoming != UNMAPPED
                    && id.pool_contains(incoming)
                    && !claimed.contains(&incoming)
                {
                    claimed.push(incoming);
                    incoming
                } else {
                    UNMAPPED
                };

                target.insert(*key, normalized.to_string());
            }
        }

        self.state = LoadState::Ready;
    }

    /// Serializa las tres colecciones en un solo payload para el backend.
    /// Dos exportaciones consecutivas sin ediciones producen payloads iguales.
    pub fn export(&self) -> MappingsPayload {
        let mut payload = MappingsPayload::default();
        for id in CollectionId::ALL {
            let target = payload.collection_mut(id);
            for (key, action) in &self.collections[id.index()] {
                target.insert((*key).to_string(), action.clone());
            }
        }
        payload
    }

    /// Acción actualmente asignada a una tecla
    pub fn get(&self, collection: CollectionId, key: &str) -> Option<&str> {
        self.collections[collection.index()]
            .get(key)
            .map(String::as_str)
    }

    /// Subconjunto del catálogo que es legal asignar a `key`: todo el
    /// catálogo menos las acciones reclamadas por OTRAS teclas de la misma
    /// colección. Siempre incluye `unmapped` y la acción actual de `key`.
    pub fn available_actions(
        &self,
        collection: CollectionId,
        key: &str,
    ) -> Result<Vec<Action>, MappingError> {
        if !self.is_ready() {
            return Err(MappingError::NotLoaded);
        }
        if !collection.has_key(key) {
            return Err(MappingError::UnknownKey {
                collection,
                key: key.to_string(),
            });
        }

        let bindings = &self.collections[collection.index()];
        let claimed_by_others: Vec<&str> = bindings
            .iter()
            .filter(|(other, action)| **other != key && action.as_str() != UNMAPPED)
            .map(|(_, action)| action.as_str())
            .collect();

        Ok(collection
            .pool()
            .iter()
            .filter(|action| !claimed_by_others.contains(&action.internal))
            .copied()
            .collect())
    }

    /// Asigna una acción a una tecla. Local y síncrono; la lista de opciones
    /// ya excluye las asignaciones ilegales, pero no confiamos ciegamente en
    /// el llamador: todo identificador fuera de `available_actions` se
    /// rechaza con error tipado.
    pub fn set_mapping(
        &mut self,
        collection: CollectionId,
        key: &str,
        action_id: &str,
    ) -> Result<(), MappingError> {
        let static_key = collection
            .keys()
            .iter()
            .copied()
            .find(|k| *k == key)
            .ok_or_else(|| MappingError::UnknownKey {
                collection,
                key: key.to_string(),
            })?;

        let offered = self.available_actions(collection, static_key)?;
        if !offered.iter().any(|a| a.internal == action_id) {
            return Err(MappingError::UnavailableAction {
                collection,
                key: key.to_string(),
                action: action_id.to_string(),
            });
        }

        self.collections[collection.index()].insert(static_key, action_id.to_string());
        Ok(())
    }
}

impl Default for MappingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CollectionId::{Direction, Gesture, Motion};

    fn ready_store() -> MappingStore {
        let mut store = MappingStore::new();
        store.import(&MappingsPayload::default());
        store
    }

    fn offered_ids(store: &MappingStore, collection: CollectionId, key: &str) -> Vec<String> {
        store
            .available_actions(collection, key)
            .unwrap()
            .iter()
            .map(|a| a.internal.to_string())
            .collect()
    }

    #[test]
    fn edits_rejected_while_loading() {
        let mut store = MappingStore::new();
        assert_eq!(store.load_state(), LoadState::Loading);
        assert!(matches!(
            store.set_mapping(Gesture, "fist", "mute"),
            Err(MappingError::NotLoaded)
        ));
        assert!(matches!(
            store.available_actions(Gesture, "fist"),
            Err(MappingError::NotLoaded)
        ));

        store.import(&MappingsPayload::default());
        assert_eq!(store.load_state(), LoadState::Ready);
        assert!(store.set_mapping(Gesture, "fist", "mute").is_ok());
    }

    #[test]
    fn assigned_action_disappears_for_siblings_only() {
        let mut store = ready_store();
        store.set_mapping(Gesture, "fist", "mute").unwrap();

        // mute ya no se ofrece a otras teclas de gestos...
        assert!(!offered_ids(&store, Gesture, "open_palm").contains(&"mute".to_string()));
        // ...pero sigue disponible para la propia tecla y para direcciones
        assert!(offered_ids(&store, Gesture, "fist").contains(&"mute".to_string()));
        assert!(offered_ids(&store, Direction, "up").contains(&"mute".to_string()));
    }

    #[test]
    fn options_always_include_unmapped_and_current() {
        let mut store = ready_store();
        store.set_mapping(Gesture, "fist", "volume_up").unwrap();

        for key in Gesture.keys() {
            let offered = offered_ids(&store, Gesture, key);
            assert!(offered.contains(&UNMAPPED.to_string()));
        }
        assert!(offered_ids(&store, Gesture, "fist").contains(&"volume_up".to_string()));
    }

    #[test]
    fn uniqueness_holds_after_edit_sequences() {
        let mut store = ready_store();

        // Secuencia de ediciones siempre tomadas de las opciones ofrecidas
        store.set_mapping(Gesture, "fist", "mute").unwrap();
        store.set_mapping(Gesture, "open_palm", "volume_up").unwrap();
        store.set_mapping(Gesture, "fist", UNMAPPED).unwrap();
        store.set_mapping(Gesture, "ok_sign", "mute").unwrap();
        store.set_mapping(Motion, "up", "next_track").unwrap();

        for collection in CollectionId::ALL {
            let mut seen: Vec<&str> = Vec::new();
            for key in collection.keys() {
                let action = store.get(collection, key).unwrap();
                if action != UNMAPPED {
                    assert!(!seen.contains(&action), "acción duplicada: {}", action);
                    seen.push(action);
                }
            }
        }
    }

    #[test]
    fn conflicting_assignment_is_rejected() {
        let mut store = ready_store();
        store.set_mapping(Gesture, "fist", "mute").unwrap();

        assert!(matches!(
            store.set_mapping(Gesture, "open_palm", "mute"),
            Err(MappingError::UnavailableAction { .. })
        ));
        // El titular original no cambió
        assert_eq!(store.get(Gesture, "fist"), Some("mute"));
    }

    #[test]
    fn out_of_pool_action_is_rejected() {
        let mut store = ready_store();
        assert!(matches!(
            store.set_mapping(Motion, "up", "mute"),
            Err(MappingError::UnavailableAction { .. })
        ));
        assert!(matches!(
            store.set_mapping(Gesture, "puño", "mute"),
            Err(MappingError::UnknownKey { .. })
        ));
    }

    #[test]
    fn unbinding_frees_action_immediately() {
        let mut store = ready_store();
        store.set_mapping(Gesture, "fist", "play_pause").unwrap();
        store.set_mapping(Gesture, "fist", UNMAPPED).unwrap();

        // Liberada al instante para las demás teclas
        assert!(offered_ids(&store, Gesture, "peace_sign").contains(&"play_pause".to_string()));
    }

    #[test]
    fn import_normalizes_malformed_payload() {
        let mut payload = MappingsPayload::default();
        payload
            .gesture_mappings
            .insert("fist".to_string(), "mute".to_string());
        // Duplicado dentro de la colección: solo la primera tecla lo conserva
        payload
            .gesture_mappings
            .insert("open_palm".to_string(), "mute".to_string());
        // Acción fuera de catálogo y tecla desconocida
        payload
            .gesture_mappings
            .insert("ok_sign".to_string(), "launch_missiles".to_string());
        payload
            .gesture_mappings
            .insert("telekinesis".to_string(), "mute".to_string());

        let mut store = MappingStore::new();
        store.import(&payload);

        assert_eq!(store.get(Gesture, "fist"), Some("mute"));
        assert_eq!(store.get(Gesture, "open_palm"), Some(UNMAPPED));
        assert_eq!(store.get(Gesture, "ok_sign"), Some(UNMAPPED));
        assert_eq!(store.get(Gesture, "telekinesis"), None);
    }

    #[test]
    fn export_is_idempotent_and_round_trips() {
        let mut store = ready_store();
        store.set_mapping(Gesture, "fist", "mute").unwrap();
        store.set_mapping(Motion, "left", "prev_track").unwrap();

        let first = store.export();
        let second = store.export();
        assert_eq!(first, second);

        // Reimportar el payload exportado reproduce el mismo estado
        let mut reloaded = MappingStore::new();
        reloaded.import(&first);
        assert_eq!(reloaded.export(), first);
    }

    #[test]
    fn payload_uses_backend_field_names() {
        let json = serde_json::to_string(&MappingsPayload::default()).unwrap();
        assert!(json.contains("gestureMappings"));
        assert!(json.contains("directionMappings"));
        assert!(json.contains("motionMappings"));
    }
}
