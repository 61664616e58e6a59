/// Identificador estable de una acción multimedia (ej. "mute", "volume_up").
/// El valor reservado `unmapped` significa "sin acción asignada".
pub const UNMAPPED: &str = "unmapped";

/// Centinela de "sin detección" para los campos de la instantánea en vivo
pub const NO_DETECTION: &str = "sin-deteccion";

/// Una acción del catálogo: identificador interno + etiqueta visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub internal: &'static str,
    pub display: &'static str,
}

/// Acción centinela presente en todos los catálogos (siempre la primera)
pub const UNMAPPED_ACTION: Action = Action {
    internal: UNMAPPED,
    display: "Sin asignar",
};

/// Catálogo de acciones multimedia para gestos y direcciones de dedo
pub const MEDIA_POOL: [Action; 5] = [
    UNMAPPED_ACTION,
    Action {
        internal: "mute",
        display: "Silenciar",
    },
    Action {
        internal: "volume_up",
        display: "Subir volumen",
    },
    Action {
        internal: "volume_down",
        display: "Bajar volumen",
    },
    Action {
        internal: "play_pause",
        display: "Reproducir/Pausar",
    },
];

/// Catálogo de acciones de transporte para movimientos de mano
/// (el catálogo de movimientos se separó del de gestos en revisiones posteriores)
pub const TRANSPORT_POOL: [Action; 5] = [
    UNMAPPED_ACTION,
    Action {
        internal: "next_track",
        display: "Siguiente pista",
    },
    Action {
        internal: "prev_track",
        display: "Pista anterior",
    },
    Action {
        internal: "seek_forward",
        display: "Adelantar",
    },
    Action {
        internal: "seek_backward",
        display: "Retroceder",
    },
];

/// Teclas fijas de cada colección. Solo cambian los valores asignados,
/// nunca el conjunto de teclas.
pub const GESTURE_KEYS: [&str; 5] = ["fist", "open_palm", "ok_sign", "peace_sign", "devil_horns"];
pub const DIRECTION_KEYS: [&str; 4] = ["up", "down", "left", "right"];
pub const MOTION_KEYS: [&str; 4] = ["up", "down", "left", "right"];

/// Las tres colecciones independientes de mapeos tecla → acción
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionId {
    Gesture,
    Direction,
    Motion,
}

impl CollectionId {
    pub const ALL: [CollectionId; 3] = [
        CollectionId::Gesture,
        CollectionId::Direction,
        CollectionId::Motion,
    ];

    /// Índice estable para almacenar las colecciones en un arreglo
    pub fn index(self) -> usize {
        match self {
            CollectionId::Gesture => 0,
            CollectionId::Direction => 1,
            CollectionId::Motion => 2,
        }
    }

    /// Conjunto fijo de teclas de la colección
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            CollectionId::Gesture => &GESTURE_KEYS,
            CollectionId::Direction => &DIRECTION_KEYS,
            CollectionId::Motion => &MOTION_KEYS,
        }
    }

    /// Catálogo de acciones del que se sirve la colección.
    /// Gestos y direcciones comparten catálogo; movimientos usa el suyo.
    pub fn pool(self) -> &'static [Action] {
        match self {
            CollectionId::Gesture | CollectionId::Direction => &MEDIA_POOL,
            CollectionId::Motion => &TRANSPORT_POOL,
        }
    }

    /// Etiqueta visible de la colección
    pub fn display(self) -> &'static str {
        match self {
            CollectionId::Gesture => "Gestos",
            CollectionId::Direction => "Direcciones de dedo",
            CollectionId::Motion => "Movimientos de mano",
        }
    }

    /// Nombre corto aceptado en la línea de comandos
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "gesture" | "gestos" => Some(CollectionId::Gesture),
            "direction" | "direcciones" => Some(CollectionId::Direction),
            "motion" | "movimientos" => Some(CollectionId::Motion),
            _ => None,
        }
    }

    /// ¿La tecla pertenece al conjunto fijo de la colección?
    pub fn has_key(self, key: &str) -> bool {
        self.keys().iter().any(|k| *k == key)
    }

    /// ¿El identificador pertenece al catálogo de la colección?
    pub fn pool_contains(self, action_id: &str) -> bool {
        self.pool().iter().any(|a| a.internal == action_id)
    }

    /// Etiqueta visible de una acción del catálogo ("?" si no pertenece)
    pub fn action_display(self, action_id: &str) -> &'static str {
        self.pool()
            .iter()
            .find(|a| a.internal == action_id)
            .map(|a| a.display)
            .unwrap_or("?")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pools_start_with_unmapped() {
        for collection in CollectionId::ALL {
            assert_eq!(collection.pool()[0].internal, UNMAPPED);
        }
    }

    #[test]
    fn motion_pool_is_independent() {
        // Movimientos usa un catálogo distinto al de gestos/direcciones
        assert!(CollectionId::Gesture.pool_contains("mute"));
        assert!(!CollectionId::Motion.pool_contains("mute"));
        assert!(CollectionId::Motion.pool_contains("next_track"));
    }

    #[test]
    fn parse_accepts_both_spellings() {
        assert_eq!(CollectionId::parse("gesture"), Some(CollectionId::Gesture));
        assert_eq!(CollectionId::parse("movimientos"), Some(CollectionId::Motion));
        assert_eq!(CollectionId::parse("otro"), None);
    }

    #[test]
    fn key_sets_are_fixed() {
        assert!(CollectionId::Gesture.has_key("fist"));
        assert!(!CollectionId::Gesture.has_key("up"));
        assert!(CollectionId::Motion.has_key("up"));
    }
}
