//! The collections a fresh grimoire starts with.

use crate::model::{Collection, CollectionField, FieldType};

const PLANETS: &[&str] = &[
    "Sol",
    "Måne",
    "Mars",
    "Merkurius",
    "Jupiter",
    "Venus",
    "Saturnus",
    "—",
];
const ELEMENTS: &[&str] = &["Eld", "Vatten", "Luft", "Jord", "Ande", "—"];

fn text(key: &str, label: &str) -> CollectionField {
    CollectionField::new(key, label, FieldType::Text)
}

fn long(key: &str, label: &str) -> CollectionField {
    CollectionField::new(key, label, FieldType::Longtext)
}

fn collection(
    id: &str,
    name: &str,
    icon: &str,
    subtitle: &[&str],
    fields: Vec<CollectionField>,
) -> Collection {
    Collection {
        id: id.to_string(),
        name: name.to_string(),
        icon: Some(icon.to_string()),
        fields,
        subtitle_keys: subtitle.iter().map(|key| key.to_string()).collect(),
    }
}

/// Seeded into the store the first time collections are read.
pub fn default_collections() -> Vec<Collection> {
    vec![
        collection(
            "demons",
            "Demoner",
            "👹",
            &["rank", "aspect"],
            vec![
                CollectionField::select(
                    "rank",
                    "Rang",
                    &[
                        "Kung",
                        "Prins",
                        "Hertig",
                        "Markis",
                        "Greve",
                        "President",
                        "Furste",
                        "Soldat",
                        "Okänd",
                    ],
                ),
                text("aspect", "Aspekt/område"),
                CollectionField::select("planet", "Planet", PLANETS),
                CollectionField::select("element", "Element", ELEMENTS),
                text("incense", "Rökelse/ört"),
                text("offering", "Erbjudanden"),
                text("day", "Dag/tid"),
                long("sigil", "Sigill (beskrivning)"),
                long("warnings", "Varningar"),
            ],
        ),
        collection(
            "gods",
            "Gudar",
            "⚡",
            &["pantheon", "domains"],
            vec![
                text("pantheon", "Pantheon"),
                text("domains", "Domäner"),
                text("epithets", "Epitet/titlar"),
                text("festival", "Högtider/dagar"),
                text("sacred", "Heliga djur/platser"),
                long("correspond", "Korrespondenser"),
            ],
        ),
        collection(
            "angels",
            "Änglar",
            "🪽",
            &["choir", "office"],
            vec![
                CollectionField::select(
                    "choir",
                    "Kör/hierarki",
                    &[
                        "Ärkeängel",
                        "Knekt",
                        "Körer",
                        "Troner",
                        "Krafterna",
                        "Furstar",
                        "Herravälden",
                        "Keruber",
                        "Serafer",
                        "Okänd",
                    ],
                ),
                text("office", "Uppdrag/titel"),
                long("sigil", "Sigill/tecken"),
                long("virtues", "Dygder/hjälp"),
                text("psalm", "Psalm/vers"),
            ],
        ),
        collection(
            "spirits",
            "Naturväsen",
            "🌲",
            &["region", "type"],
            vec![
                text("region", "Region/habitat"),
                CollectionField::select(
                    "type",
                    "Typ",
                    &[
                        "Skog",
                        "Vatten",
                        "Berg",
                        "Fält",
                        "Hushåll",
                        "Gränsplatser",
                        "Öken",
                        "Okänd",
                    ],
                ),
                long("traits", "Drag"),
                long("gifts", "Gåvor/etikett"),
                long("risks", "Risker"),
            ],
        ),
        collection(
            "creatures",
            "Väsen",
            "🐾",
            &["habitat", "taxonomy"],
            vec![
                text("habitat", "Habitat"),
                text("taxonomy", "Typ"),
                long("behavior", "Beteende"),
                long("signs", "Tecken/omständigheter"),
            ],
        ),
        collection(
            "crystals",
            "Kristaller & mineraler",
            "💎",
            &["color", "chakra"],
            vec![
                CollectionField::new("hardness", "Hårdhet (Mohs)", FieldType::Number),
                text("color", "Färg"),
                text("system", "Kristallsystem"),
                CollectionField::select(
                    "chakra",
                    "Chakra",
                    &[
                        "Rot",
                        "Sakral",
                        "Solar plexus",
                        "Hjärta",
                        "Hals",
                        "Tredje ögat",
                        "Krona",
                        "Alla",
                    ],
                ),
                CollectionField::select("element", "Element", ELEMENTS),
                long("uses", "Användning"),
                long("cleansing", "Rengöring/laddning"),
            ],
        ),
        collection(
            "herbs",
            "Örter & växter",
            "🌿",
            &["latin", "planet"],
            vec![
                text("latin", "Latinskt namn"),
                text("parts", "Delar som används"),
                CollectionField::select("planet", "Planet", PLANETS),
                CollectionField::select("element", "Element", ELEMENTS),
                long("uses", "Användning"),
                long("correspondences", "Korrespondenser"),
                long("safety", "Säkerhet"),
            ],
        ),
        collection(
            "aura",
            "Aura",
            "✨",
            &["color", "state"],
            vec![
                text("color", "Färg/nyans"),
                text("state", "Tillstånd/rörelse"),
                long("reading", "Tolkning"),
                long("balance", "Rekommenderad balans"),
            ],
        ),
        collection(
            "runes",
            "Runor",
            "ᚠ",
            &["glyph", "phoneme"],
            vec![
                text("glyph", "Grafem"),
                text("phoneme", "Ljudvärde"),
                long("meaning", "Betydelser"),
                long("reversed", "Omvänd betydelse"),
                long("galdr", "Bindrunor/galdrar"),
            ],
        ),
        collection(
            "healing",
            "Healing",
            "🜁",
            &["method", "intent"],
            vec![
                text("method", "Metod/verktyg"),
                text("intent", "Syfte"),
                long("materials", "Material"),
                long("steps", "Steg"),
                long("aftercare", "Eftervård"),
                long("contra", "Kontraindikationer"),
            ],
        ),
        collection(
            "curses",
            "Förbannelser",
            "☠️",
            &["target"],
            vec![
                text("target", "Mål/avsikt"),
                long("materials", "Material"),
                long("construction", "Konstruktion"),
                long("safety", "Säkerhet/avslut"),
                long("ethics", "Etik/överväganden"),
            ],
        ),
        collection(
            "spells",
            "Trollformler",
            "🪄",
            &["intent", "timing"],
            vec![
                text("intent", "Avsikt"),
                text("timing", "Fönster (tid/astro)"),
                long("ingredients", "Ingredienser"),
                long("execution", "Utförande"),
                long("omens", "Tecken på effekt"),
            ],
        ),
        collection(
            "rituals",
            "Ritualer",
            "🕯️",
            &["purpose"],
            vec![
                text("purpose", "Syfte"),
                long("tools", "Verktyg/korrespondenser"),
                long("steps", "Steg"),
                long("closing", "Risker/brytning"),
            ],
        ),
        collection("notes", "Anteckningar", "📝", &[], Vec::new()),
    ]
}
