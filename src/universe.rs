use crate::models::{Instrument, Region};

/// The compiled-in registry of tracked instruments. Order matters: it is the
/// tie-break order for equal percentage changes. Extend by adding entries.
pub fn default_universe() -> Vec<Instrument> {
    fn entry(symbol: &str, name: &str, region: Region, sector: &str) -> Instrument {
        Instrument {
            symbol: symbol.to_string(),
            name: name.to_string(),
            region,
            sector: sector.to_string(),
        }
    }

    vec![
        entry("NVDA", "NVIDIA", Region::Us, "Technology"),
        entry("AAPL", "Apple", Region::Us, "Technology"),
        entry("BP.L", "BP", Region::Uk, "Energy"),
        entry("7203.T", "Toyota", Region::Asia, "Automotive"),
        entry("ASML.AS", "ASML", Region::Eu, "Technology"),
    ]
}

/// Distinct sectors present in the registry, sorted for stable display.
pub fn distinct_sectors(universe: &[Instrument]) -> Vec<String> {
    let mut sectors: Vec<String> = universe.iter().map(|i| i.sector.clone()).collect();
    sectors.sort();
    sectors.dedup();
    sectors
}
