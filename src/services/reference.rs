use std::collections::HashMap;
use std::sync::LazyLock;

/// Shown for any biomarker not in the table.
pub const GENERIC_DESCRIPTION: &str =
    "A marker measured in your blood test. Ask your doctor what it means for you.";

/// Plain-English one-liners keyed by uppercase biomarker name.
static DESCRIPTIONS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        // Complete blood count
        ("HEMOGLOBIN", "Protein in red blood cells that carries oxygen around the body."),
        ("HAEMOGLOBIN", "Protein in red blood cells that carries oxygen around the body."),
        ("HB", "Protein in red blood cells that carries oxygen around the body."),
        ("RBC", "Red blood cells, which carry oxygen from the lungs to your tissues."),
        ("RBC COUNT", "Red blood cells, which carry oxygen from the lungs to your tissues."),
        ("WBC", "White blood cells, which fight infection."),
        ("WBC COUNT", "White blood cells, which fight infection."),
        ("TOTAL LEUCOCYTE COUNT", "White blood cells, which fight infection."),
        ("PLATELETS", "Cell fragments that help your blood clot."),
        ("PLATELET COUNT", "Cell fragments that help your blood clot."),
        ("HEMATOCRIT", "Share of your blood volume made up of red blood cells."),
        ("PCV", "Share of your blood volume made up of red blood cells."),
        ("MCV", "Average size of your red blood cells."),
        ("MCH", "Average amount of hemoglobin in each red blood cell."),
        ("MCHC", "Concentration of hemoglobin inside red blood cells."),
        ("RDW", "How much your red blood cells vary in size."),
        ("NEUTROPHILS", "White blood cells that respond first to bacterial infection."),
        ("LYMPHOCYTES", "White blood cells that fight viruses and make antibodies."),
        ("EOSINOPHILS", "White blood cells involved in allergies and parasite defence."),
        ("MONOCYTES", "White blood cells that clear debris and fight infection."),
        ("BASOPHILS", "White blood cells involved in allergic reactions."),
        ("ESR", "How fast red cells settle; a general sign of inflammation."),
        // Blood sugar
        ("GLUCOSE", "Sugar in your blood, the body's main source of energy."),
        ("FASTING GLUCOSE", "Blood sugar after not eating for at least 8 hours."),
        ("FASTING BLOOD SUGAR", "Blood sugar after not eating for at least 8 hours."),
        ("HBA1C", "Average blood sugar over the last two to three months."),
        // Lipids
        ("TOTAL CHOLESTEROL", "All the cholesterol carried in your blood."),
        ("CHOLESTEROL", "All the cholesterol carried in your blood."),
        ("HDL", "\"Good\" cholesterol that helps clear fat from your arteries."),
        ("HDL CHOLESTEROL", "\"Good\" cholesterol that helps clear fat from your arteries."),
        ("LDL", "\"Bad\" cholesterol that can build up in artery walls."),
        ("LDL CHOLESTEROL", "\"Bad\" cholesterol that can build up in artery walls."),
        ("TRIGLYCERIDES", "Fat in your blood that stores unused calories."),
        ("VLDL", "Particles that carry triglycerides through the blood."),
        // Kidney
        ("CREATININE", "Waste from muscle use, filtered out by the kidneys."),
        ("UREA", "Waste from protein breakdown, filtered out by the kidneys."),
        ("BUN", "Nitrogen from urea; reflects how well the kidneys clear waste."),
        ("URIC ACID", "Waste from purine breakdown; high levels can cause gout."),
        ("EGFR", "Estimated filtering rate of your kidneys."),
        // Liver
        ("ALT", "Liver enzyme; rises when liver cells are irritated."),
        ("SGPT", "Liver enzyme; rises when liver cells are irritated."),
        ("AST", "Enzyme found in liver and muscle; rises with cell damage."),
        ("SGOT", "Enzyme found in liver and muscle; rises with cell damage."),
        ("ALKALINE PHOSPHATASE", "Enzyme from liver and bone."),
        ("TOTAL BILIRUBIN", "Yellow pigment from old red cells, processed by the liver."),
        ("BILIRUBIN", "Yellow pigment from old red cells, processed by the liver."),
        ("ALBUMIN", "Main blood protein made by the liver."),
        ("TOTAL PROTEIN", "All the protein in your blood, including albumin."),
        // Electrolytes and minerals
        ("SODIUM", "Electrolyte that balances water in the body."),
        ("POTASSIUM", "Electrolyte needed for nerves, muscles and heart rhythm."),
        ("CHLORIDE", "Electrolyte that helps keep fluids and acidity balanced."),
        ("CALCIUM", "Mineral for bones, muscles and nerves."),
        ("MAGNESIUM", "Mineral used by muscles, nerves and energy production."),
        ("PHOSPHORUS", "Mineral that works with calcium to build bones."),
        // Thyroid
        ("TSH", "Pituitary hormone that tells the thyroid how hard to work."),
        ("T3", "Active thyroid hormone that sets your metabolic pace."),
        ("T4", "Main hormone released by the thyroid."),
        ("FREE T4", "Unbound thyroid hormone available to your tissues."),
        // Vitamins and iron
        ("VITAMIN D", "Vitamin for bone strength and immunity, made from sunlight."),
        ("25-OH VITAMIN D", "Vitamin for bone strength and immunity, made from sunlight."),
        ("VITAMIN B12", "Vitamin for nerves and making red blood cells."),
        ("FOLATE", "B vitamin needed to make healthy cells."),
        ("IRON", "Mineral used to make hemoglobin."),
        ("SERUM IRON", "Mineral used to make hemoglobin."),
        ("FERRITIN", "Your body's stored iron."),
        ("TIBC", "How much iron your blood is able to carry."),
        // Inflammation
        ("CRP", "Protein that rises with inflammation or infection."),
    ])
});

fn lookup_key(parameter: &str) -> String {
    parameter
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Plain-English description for a biomarker name, or the generic fallback.
pub fn describe(parameter: &str) -> &'static str {
    DESCRIPTIONS
        .get(lookup_key(parameter).as_str())
        .copied()
        .unwrap_or(GENERIC_DESCRIPTION)
}
