//! The structured site report and its tolerant JSON decoding.
//!
//! The service answers in Portuguese keys (`municipio`, `clima`, ...) and is
//! loose about types: numbers arrive as strings, Brazilian decimal commas
//! show up, nested sections go missing or come back as `null`. Every field
//! is optional and a value that cannot be read becomes `None` instead of
//! failing the report. Serialization uses the English field names.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteReport {
    #[serde(
        default,
        rename(deserialize = "municipio"),
        alias = "municipality",
        deserialize_with = "lenient_string"
    )]
    pub municipality: Option<String>,
    #[serde(
        default,
        rename(deserialize = "estado"),
        alias = "state",
        deserialize_with = "lenient_string"
    )]
    pub state: Option<String>,
    #[serde(
        default,
        rename(deserialize = "regiao_agricola"),
        alias = "agricultural_region",
        deserialize_with = "lenient_string"
    )]
    pub agricultural_region: Option<String>,
    #[serde(
        default,
        rename(deserialize = "bioma"),
        alias = "biome",
        deserialize_with = "lenient_string"
    )]
    pub biome: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub area_hectares: Option<f64>,
    #[serde(
        default,
        rename(deserialize = "clima"),
        alias = "climate",
        deserialize_with = "lenient_section"
    )]
    pub climate: Option<ClimateProfile>,
    #[serde(
        default,
        rename(deserialize = "logistica"),
        alias = "logistics",
        deserialize_with = "lenient_section"
    )]
    pub logistics: Option<LogisticsProfile>,
    #[serde(
        default,
        rename(deserialize = "mercado"),
        alias = "market",
        deserialize_with = "lenient_section"
    )]
    pub market: Option<MarketProfile>,
    #[serde(
        default,
        rename(deserialize = "risco_territorial"),
        alias = "territorial_risk",
        deserialize_with = "lenient_section"
    )]
    pub territorial_risk: Option<TerritorialRisk>,
    /// 0-100.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence_score: Option<f64>,
}

impl SiteReport {
    /// Parses the service's JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error only if `text` is not a JSON object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// `"<municipality>, <state>"` when both are known.
    #[must_use]
    pub fn headline(&self) -> Option<String> {
        match (self.municipality.as_deref(), self.state.as_deref()) {
            (Some(m), Some(s)) => Some(format!("{m}, {s}")),
            (Some(m), None) => Some(m.to_owned()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClimateProfile {
    /// Agricultural aptitude, 0-10.
    #[serde(
        default,
        rename(deserialize = "aptidao_score"),
        alias = "aptitude_score",
        deserialize_with = "lenient_f64"
    )]
    pub aptitude_score: Option<f64>,
    #[serde(
        default,
        rename(deserialize = "chuvas_anual_mm"),
        alias = "annual_rainfall_mm",
        deserialize_with = "lenient_f64"
    )]
    pub annual_rainfall_mm: Option<f64>,
    #[serde(
        default,
        rename(deserialize = "risco_hidrico"),
        alias = "water_risk",
        deserialize_with = "lenient_string"
    )]
    pub water_risk: Option<String>,
}

impl ClimateProfile {
    pub const BAR_COUNT: u8 = 5;

    /// Number of filled bars on the five-bar aptitude gauge: one bar per two
    /// score points, rounded down.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn aptitude_bars(&self) -> u8 {
        let Some(score) = self.aptitude_score.filter(|s| s.is_finite()) else {
            return 0;
        };
        // Clamped to 0..=BAR_COUNT, so the cast is exact.
        (score / 2.0).floor().clamp(0.0, f64::from(Self::BAR_COUNT)) as u8
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogisticsProfile {
    #[serde(
        default,
        rename(deserialize = "distancia_rodovia_km"),
        alias = "highway_distance_km",
        deserialize_with = "lenient_f64"
    )]
    pub highway_distance_km: Option<f64>,
    #[serde(
        default,
        rename(deserialize = "distancia_porto_km"),
        alias = "port_distance_km",
        deserialize_with = "lenient_f64"
    )]
    pub port_distance_km: Option<f64>,
    #[serde(
        default,
        rename(deserialize = "principal_escoamento"),
        alias = "main_outlet",
        deserialize_with = "lenient_string"
    )]
    pub main_outlet: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketProfile {
    #[serde(
        default,
        rename(deserialize = "preco_terra_ha_brl"),
        alias = "land_price_per_ha_brl",
        deserialize_with = "lenient_f64"
    )]
    pub land_price_per_ha_brl: Option<f64>,
    #[serde(
        default,
        rename(deserialize = "liquidez_regional"),
        alias = "regional_liquidity",
        deserialize_with = "lenient_string"
    )]
    pub regional_liquidity: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerritorialRisk {
    #[serde(
        default,
        rename(deserialize = "classificacao"),
        alias = "classification",
        deserialize_with = "lenient_risk"
    )]
    pub classification: Option<RiskLevel>,
    #[serde(
        default,
        rename(deserialize = "detalhes"),
        alias = "details",
        deserialize_with = "lenient_string"
    )]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baixo" | "baixa" | "low" => Ok(RiskLevel::Low),
            "medio" | "médio" | "media" | "média" | "moderado" | "medium" | "moderate" => {
                Ok(RiskLevel::Medium)
            }
            "alto" | "alta" | "high" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level \"{other}\"")),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_loose_number(&s),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}

fn lenient_risk<'de, D>(deserializer: D) -> Result<Option<RiskLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.and_then(|s| s.parse().ok()))
}

fn lenient_section<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .filter(Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok()))
}

/// Reads `"1.250"`, `"1.250,50"`, `"1250.5"`, `"R$ 18.000/ha"` and
/// `"1.400 mm"`. Returns `None` when no digits are present.
fn parse_loose_number(raw: &str) -> Option<f64> {
    let kept: String = raw
        .chars()
        .skip_while(|c| !(c.is_ascii_digit() || *c == '-'))
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalised = match (kept.rfind(','), kept.rfind('.')) {
        // Brazilian: dots group thousands, comma marks decimals.
        (Some(_), _) => kept.replace('.', "").replace(',', "."),
        // Several dots, or exactly three digits after a lone dot, means
        // thousands grouping.
        (None, Some(dot)) if kept.matches('.').count() > 1 || kept.len() - dot - 1 == 3 => {
            kept.replace('.', "")
        }
        _ => kept,
    };
    normalised.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_portuguese_payload() {
        let json = r#"{
            "municipio": "Sorriso",
            "estado": "MT",
            "regiao_agricola": "Médio-Norte",
            "bioma": "Cerrado/Amazônia",
            "area_hectares": 1250.5,
            "clima": { "aptidao_score": 9, "chuvas_anual_mm": "2.100", "risco_hidrico": "Baixo" },
            "logistica": { "distancia_rodovia_km": 12, "distancia_porto_km": "1.100", "principal_escoamento": "BR-163" },
            "mercado": { "preco_terra_ha_brl": "R$ 45.000,00", "liquidez_regional": "Alta" },
            "risco_territorial": { "classificacao": "Medio", "detalhes": "Proximidade de APP" },
            "confidence_score": "87"
        }"#;
        let report = SiteReport::from_json(json).unwrap();

        assert_eq!(report.headline().as_deref(), Some("Sorriso, MT"));
        assert_eq!(report.biome.as_deref(), Some("Cerrado/Amazônia"));
        assert_eq!(report.area_hectares, Some(1250.5));

        let climate = report.climate.unwrap();
        assert_eq!(climate.aptitude_score, Some(9.0));
        assert_eq!(climate.annual_rainfall_mm, Some(2100.0));
        assert_eq!(climate.aptitude_bars(), 4);

        let logistics = report.logistics.unwrap();
        assert_eq!(logistics.port_distance_km, Some(1100.0));
        assert_eq!(logistics.main_outlet.as_deref(), Some("BR-163"));

        assert_eq!(report.market.unwrap().land_price_per_ha_brl, Some(45_000.0));

        let risk = report.territorial_risk.unwrap();
        assert_eq!(risk.classification, Some(RiskLevel::Medium));
        assert_eq!(report.confidence_score, Some(87.0));
    }

    #[test]
    fn unreadable_values_become_none() {
        let json = r#"{
            "municipio": null,
            "area_hectares": "desconhecida",
            "clima": "indisponível",
            "risco_territorial": { "classificacao": "Extremo" },
            "confidence_score": [1, 2]
        }"#;
        let report = SiteReport::from_json(json).unwrap();

        assert!(report.municipality.is_none());
        assert!(report.area_hectares.is_none());
        assert!(report.climate.is_none());
        assert!(report.territorial_risk.unwrap().classification.is_none());
        assert!(report.confidence_score.is_none());
    }

    #[test]
    fn empty_object_is_an_empty_report() {
        let report = SiteReport::from_json("{}").unwrap();
        assert!(report.headline().is_none());
        assert!(report.market.is_none());
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(SiteReport::from_json("[]").is_err());
        assert!(SiteReport::from_json("not json").is_err());
    }

    #[test]
    fn english_keys_are_accepted_and_serialized() {
        let json = r#"{"municipality":"Rio Verde","state":"GO","territorial_risk":{"classification":"low"}}"#;
        let report = SiteReport::from_json(json).unwrap();
        assert_eq!(report.municipality.as_deref(), Some("Rio Verde"));

        let out = serde_json::to_value(&report).unwrap();
        assert_eq!(out["municipality"], "Rio Verde");
        assert_eq!(out["territorial_risk"]["classification"], "low");
    }

    #[test]
    fn risk_levels_parse_in_both_languages() {
        assert_eq!("Baixo".parse::<RiskLevel>(), Ok(RiskLevel::Low));
        assert_eq!("médio".parse::<RiskLevel>(), Ok(RiskLevel::Medium));
        assert_eq!("ALTO".parse::<RiskLevel>(), Ok(RiskLevel::High));
        assert_eq!("high".parse::<RiskLevel>(), Ok(RiskLevel::High));
        assert!("n/a".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn aptitude_bars_clamp_to_gauge() {
        let bars = |score: Option<f64>| {
            ClimateProfile {
                aptitude_score: score,
                ..ClimateProfile::default()
            }
            .aptitude_bars()
        };
        assert_eq!(bars(None), 0);
        assert_eq!(bars(Some(0.0)), 0);
        assert_eq!(bars(Some(5.5)), 2);
        assert_eq!(bars(Some(10.0)), 5);
        assert_eq!(bars(Some(14.0)), 5);
        assert_eq!(bars(Some(-3.0)), 0);
    }

    #[test]
    fn loose_numbers() {
        assert_eq!(parse_loose_number("1.250"), Some(1250.0));
        assert_eq!(parse_loose_number("1.250,50"), Some(1250.5));
        assert_eq!(parse_loose_number("1250.5"), Some(1250.5));
        assert_eq!(parse_loose_number("1.400 mm"), Some(1400.0));
        assert_eq!(parse_loose_number("R$ 18.000/ha"), Some(18000.0));
        assert_eq!(parse_loose_number("n/d"), None);
    }
}
