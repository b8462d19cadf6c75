use crate::schema::DateRange;

/// Narrative request sent to the text-generation service for one client report.
pub fn narrative_prompt(client_id: i64, range: &DateRange) -> String {
    format!(
        "Cliente {} solicita un informe detallado sobre datos financieros y de transacciones \
         relevantes entre {} y {}. \
         El informe debe incluir: \n\
         - Resumen de ingresos y gastos.\n\
         - Análisis de inversiones y pagos realizados.\n\
         - Datos organizados por meses y totales anuales.\n\
         - Visualizaciones de las tendencias en el tiempo.\n\
         Asegúrate de usar todos los datos disponibles para proporcionar un resumen claro y relevante.",
        client_id,
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d")
    )
}
