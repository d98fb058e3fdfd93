//! Built-in catalog definitions.
//!
//! The only copy of the standard data. `Catalog::to_ron_string` renders it as
//! an editable document for `catalog_path`.

use std::collections::BTreeMap;

use super::{CatalogDef, CharacterClass, EncounterTier, EncounterType, MapDef, PassiveNode};

fn class(id: &str, name: &str, label: &str, start_node: &str, flavor: &str) -> CharacterClass {
    CharacterClass {
        id: id.into(),
        name: name.into(),
        label: label.into(),
        flavor: flavor.into(),
        start_node: start_node.into(),
    }
}

fn node(
    id: &str,
    name: &str,
    description: &str,
    requires: &[&str],
    effects: &[(&str, f64)],
    start_for: Option<&str>,
) -> PassiveNode {
    PassiveNode {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        requires: requires.iter().map(|r| r.to_string()).collect(),
        effects: effects
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect::<BTreeMap<_, _>>(),
        start_for: start_for.map(Into::into),
    }
}

fn map(id: &str, name: &str, color: &str, base_difficulty: f64, description: &str) -> MapDef {
    MapDef {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        color: color.into(),
        base_difficulty,
    }
}

fn encounter(tier: EncounterTier, label: &str, multiplier: f64, xp: u64) -> EncounterType {
    EncounterType {
        tier,
        label: label.into(),
        multiplier,
        xp,
    }
}

pub fn standard_def() -> CatalogDef {
    CatalogDef {
        classes: vec![
            class(
                "red",
                "Vermelho",
                "Berserker das Brasas",
                "ember-core",
                "Início agressivo com força e dano de fogo.",
            ),
            class(
                "blue",
                "Azul",
                "Teurgo da Safira",
                "sapphire-core",
                "Especialista em magia e gelo arcano.",
            ),
            class(
                "green",
                "Verde",
                "Patrulheiro da Selva",
                "verdant-core",
                "Movimento veloz e venenos constantes.",
            ),
        ],
        nodes: vec![
            // === Class roots ===
            node(
                "ember-core",
                "Núcleo de Brasas",
                "Vida + dano físico base para o início vermelho.",
                &[],
                &[("vida", 20.0), ("dano", 4.0)],
                Some("red"),
            ),
            node(
                "sapphire-core",
                "Núcleo de Safira",
                "Mana e dano elemental para o início azul.",
                &[],
                &[("mana", 15.0), ("magia", 5.0)],
                Some("blue"),
            ),
            node(
                "verdant-core",
                "Núcleo Esmeralda",
                "Velocidade e evasão para o início verde.",
                &[],
                &[("agilidade", 8.0), ("evasao", 5.0)],
                Some("green"),
            ),
            // === Flat nodes ===
            node(
                "steel-frame",
                "Armadura de Aço",
                "+10 de armadura e +10 de vida. Requer um núcleo inicial adjacente.",
                &["ember-core", "verdant-core"],
                &[("armadura", 10.0), ("vida", 10.0)],
                None,
            ),
            node(
                "glacial-control",
                "Controle Glacial",
                "+10 de magia e +8 de mana. Conecta no núcleo azul.",
                &["sapphire-core"],
                &[("magia", 10.0), ("mana", 8.0)],
                None,
            ),
            node(
                "venom-edge",
                "Lâmina Venenosa",
                "+6 de dano e +6 de veneno. Conecta no núcleo verde.",
                &["verdant-core"],
                &[("dano", 6.0), ("veneno", 6.0)],
                None,
            ),
            // === Percent nodes ===
            node(
                "flame-wheel",
                "Roda de Chamas",
                "Multiplica o dano de fogo em 10%. Requer Ember Core.",
                &["ember-core"],
                &[("danoPercent", 10.0)],
                None,
            ),
            node(
                "arcane-burst",
                "Rajada Arcana",
                "Multiplica magia em 12%. Requer Safira.",
                &["sapphire-core"],
                &[("magiaPercent", 12.0)],
                None,
            ),
            node(
                "wind-step",
                "Passo Vento",
                "Multiplica agilidade em 15%. Requer Esmeralda.",
                &["verdant-core"],
                &[("agilidadePercent", 15.0)],
                None,
            ),
        ],
        maps: vec![
            map(
                "ashes",
                "Ermos de Cinzas",
                "red",
                11.0,
                "Solo queimado com resquícios de guerra, favorece dano físico.",
            ),
            map(
                "sapphire-caves",
                "Cavernas de Safira",
                "blue",
                13.0,
                "Grotas úmidas e arcanas, monstros usam magia gelada.",
            ),
            map(
                "verdant-hollow",
                "Clareira Verdejante",
                "green",
                12.0,
                "Selva viva com venenos e emboscadas constantes.",
            ),
        ],
        encounters: vec![
            encounter(EncounterTier::Normal, "Normal", 1.0, 16),
            encounter(EncounterTier::Magic, "Mágico", 1.3, 24),
            encounter(EncounterTier::Rare, "Raro", 1.6, 34),
            encounter(EncounterTier::Boss, "Chefe", 2.4, 70),
        ],
    }
}
