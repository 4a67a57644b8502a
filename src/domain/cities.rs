// src/domain/cities.rs

/// Default target list for the air-quality pipelines: the largest French
/// communes by population.
pub const DEFAULT_CITIES: &[&str] = &[
    "Paris",
    "Lyon",
    "Marseille",
    "Toulouse",
    "Nice",
    "Nantes",
    "Montpellier",
    "Strasbourg",
    "Bordeaux",
    "Lille",
    "Rennes",
    "Reims",
    "Toulon",
    "Saint-Étienne",
    "Le Havre",
    "Dijon",
    "Grenoble",
    "Angers",
    "Villeurbanne",
    "Saint-Denis",
    "Nîmes",
    "Clermont-Ferrand",
    "Aix-en-Provence",
    "Le Mans",
    "Brest",
    "Tours",
    "Amiens",
    "Annecy",
    "Limoges",
    "Boulogne-Billancourt",
    "Metz",
    "Besançon",
    "Perpignan",
    "Orléans",
    "Rouen",
    "Montreuil",
    "Argenteuil",
    "Mulhouse",
    "Caen",
    "Nancy",
    "Saint-Paul",
    "Tourcoing",
    "Roubaix",
    "Nanterre",
    "Vitry-sur-Seine",
    "Nouméa",
    "Créteil",
    "Avignon",
    "Poitiers",
    "Aubervilliers",
    "Asnières-sur-Seine",
    "Colombes",
    "Dunkerque",
    "Aulnay-sous-Bois",
    "Saint-Pierre",
    "Versailles",
    "Courbevoie",
    "Le Tampon",
    "Béziers",
    "Rueil-Malmaison",
    "Cherbourg-en-Cotentin",
    "Champigny-sur-Marne",
    "La Rochelle",
    "Pau",
    "Fort-de-France",
    "Antibes",
    "Saint-Maur-des-Fossés",
    "Mérignac",
    "Ajaccio",
    "Cannes",
    "Saint-Nazaire",
    "Mamoudzou",
    "Drancy",
    "Noisy-le-Grand",
    "Colmar",
    "Issy-les-Moulineaux",
    "Cergy",
    "Calais",
    "Levallois-Perret",
    "Vénissieux",
    "Évry-Courcouronnes",
    "Cayenne",
    "Pessac",
    "Valence",
    "Bourges",
    "Ivry-sur-Seine",
    "Quimper",
    "Clichy",
    "Antony",
    "Troyes",
    "La Seyne-sur-Mer",
    "Montauban",
    "Villeneuve-d'Ascq",
    "Pantin",
    "Neuilly-sur-Seine",
    "Chambéry",
    "Niort",
    "Sarcelles",
    "Le Blanc-Mesnil",
    "Maisons-Alfort",
    "Lorient",
];

/// Parse a comma-separated override, dropping blanks and repeats.
pub fn parse_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !out.iter().any(|existing| existing == item) {
            out.push(item.to_string());
        }
    }
    out
}

pub fn default_cities() -> Vec<String> {
    DEFAULT_CITIES.iter().map(|c| c.to_string()).collect()
}
