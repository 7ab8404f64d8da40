use std::fmt::Write as _;

use crate::request::SiteAnalysisRequest;

/// Builds the analyst prompt for `request`.
///
/// The answer is requested as strict JSON with the Portuguese keys that
/// [`crate::SiteReport`] decodes.
#[must_use]
pub fn build_site_prompt(request: &SiteAnalysisRequest) -> String {
    let mut prompt = String::from(
        "Você é um analista agroambiental sênior especializado em terras rurais no Brasil.\n",
    );
    let _ = writeln!(
        prompt,
        "Coordenada de referência: latitude {:.6}, longitude {:.6}.",
        request.anchor.latitude, request.anchor.longitude
    );

    match (&request.ring, request.area_hectares) {
        (Some(ring), area) => {
            let _ = writeln!(
                prompt,
                "O usuário delimitou um perímetro com {} vértices (lat, lng):",
                ring.len()
            );
            for point in ring.points() {
                let _ = writeln!(prompt, "- {:.6}, {:.6}", point.latitude, point.longitude);
            }
            if let Some(area) = area {
                let _ = writeln!(prompt, "Área calculada: {area:.2} hectares.");
            }
        }
        (None, _) => prompt.push_str("O usuário marcou um ponto central.\n"),
    }

    prompt.push_str(
        "Retorne somente um objeto JSON em português com as chaves:\n\
         - municipio, estado, regiao_agricola, bioma\n\
         - area_hectares (use a área calculada quando informada; senão estime)\n\
         - clima: {aptidao_score (0-10), chuvas_anual_mm, risco_hidrico}\n\
         - logistica: {distancia_rodovia_km, distancia_porto_km, principal_escoamento}\n\
         - mercado: {preco_terra_ha_brl, liquidez_regional}\n\
         - risco_territorial: {classificacao (Baixo/Medio/Alto), detalhes}\n\
         - confidence_score (0-100)\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use prylom_core::{GeoPoint, Ring};

    use super::*;

    #[test]
    fn point_prompt_mentions_single_point() {
        let prompt = build_site_prompt(&SiteAnalysisRequest::point(GeoPoint::new(-12.5, -55.7)));
        assert!(prompt.contains("latitude -12.500000, longitude -55.700000"));
        assert!(prompt.contains("ponto central"));
        assert!(!prompt.contains("perímetro"));
        assert!(prompt.contains("risco_territorial"));
    }

    #[test]
    fn polygon_prompt_lists_vertices_and_area() {
        let ring = Ring::from_lat_lng_pairs(&[(-12.0, -55.0), (-12.0, -55.1), (-12.1, -55.1)]);
        let request = SiteAnalysisRequest::polygon(GeoPoint::new(-12.1, -55.1), ring, 612.34);
        let prompt = build_site_prompt(&request);

        assert!(prompt.contains("perímetro com 3 vértices"));
        assert!(prompt.contains("- -12.000000, -55.100000"));
        assert!(prompt.contains("Área calculada: 612.34 hectares."));
    }
}
