//! Event catalog
//!
//! Maps event names to `perf_event` events. Each entry has a canonical perf
//! tool name plus aliases, including the PAPI presets older event lists use.
//! An [`EventCode`] is the entry's index in [`CATALOG`].

use perf_event::events::{Cache, CacheOp, CacheResult, Event, Hardware, Software, WhichCache};

use crate::domain::EventCode;

#[derive(Debug)]
enum Kind {
    Hardware(Hardware),
    Software(Software),
    Cache(WhichCache, CacheOp, CacheResult),
}

#[derive(Debug)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    kind: Kind,
}

impl CatalogEntry {
    #[must_use]
    pub fn event(&self) -> Event {
        match &self.kind {
            Kind::Hardware(hw) => Event::Hardware(hw.clone()),
            Kind::Software(sw) => Event::Software(sw.clone()),
            Kind::Cache(which, operation, result) => Event::Cache(Cache {
                which: which.clone(),
                operation: operation.clone(),
                result: result.clone(),
            }),
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

const fn hw(name: &'static str, aliases: &'static [&'static str], event: Hardware) -> CatalogEntry {
    CatalogEntry {
        name,
        aliases,
        kind: Kind::Hardware(event),
    }
}

const fn sw(name: &'static str, aliases: &'static [&'static str], event: Software) -> CatalogEntry {
    CatalogEntry {
        name,
        aliases,
        kind: Kind::Software(event),
    }
}

const fn cache(
    name: &'static str,
    aliases: &'static [&'static str],
    which: WhichCache,
    operation: CacheOp,
    result: CacheResult,
) -> CatalogEntry {
    CatalogEntry {
        name,
        aliases,
        kind: Kind::Cache(which, operation, result),
    }
}

#[rustfmt::skip]
pub static CATALOG: &[CatalogEntry] = &[
    hw("cycles", &["cpu-cycles", "PAPI_TOT_CYC"], Hardware::CPU_CYCLES),
    hw("instructions", &["PAPI_TOT_INS"], Hardware::INSTRUCTIONS),
    hw("cache-references", &[], Hardware::CACHE_REFERENCES),
    hw("cache-misses", &["PAPI_L3_TCM"], Hardware::CACHE_MISSES),
    hw("branches", &["branch-instructions", "PAPI_BR_INS"], Hardware::BRANCH_INSTRUCTIONS),
    hw("branch-misses", &["PAPI_BR_MSP"], Hardware::BRANCH_MISSES),
    hw("bus-cycles", &[], Hardware::BUS_CYCLES),
    hw("stalled-cycles-frontend", &["idle-cycles-frontend"], Hardware::STALLED_CYCLES_FRONTEND),
    hw("stalled-cycles-backend", &["idle-cycles-backend", "PAPI_RES_STL"], Hardware::STALLED_CYCLES_BACKEND),
    hw("ref-cycles", &["PAPI_REF_CYC"], Hardware::REF_CPU_CYCLES),
    cache("L1-dcache-loads", &["PAPI_L1_DCA"], WhichCache::L1D, CacheOp::READ, CacheResult::ACCESS),
    cache("L1-dcache-load-misses", &["PAPI_L1_DCM"], WhichCache::L1D, CacheOp::READ, CacheResult::MISS),
    cache("L1-dcache-stores", &[], WhichCache::L1D, CacheOp::WRITE, CacheResult::ACCESS),
    cache("L1-icache-load-misses", &["PAPI_L1_ICM"], WhichCache::L1I, CacheOp::READ, CacheResult::MISS),
    cache("LLC-loads", &[], WhichCache::LL, CacheOp::READ, CacheResult::ACCESS),
    cache("LLC-load-misses", &["PAPI_L3_LDM"], WhichCache::LL, CacheOp::READ, CacheResult::MISS),
    cache("dTLB-load-misses", &["PAPI_TLB_DM"], WhichCache::DTLB, CacheOp::READ, CacheResult::MISS),
    cache("iTLB-load-misses", &["PAPI_TLB_IM"], WhichCache::ITLB, CacheOp::READ, CacheResult::MISS),
    sw("task-clock", &[], Software::TASK_CLOCK),
    sw("cpu-clock", &[], Software::CPU_CLOCK),
    sw("page-faults", &["faults"], Software::PAGE_FAULTS),
    sw("minor-faults", &[], Software::PAGE_FAULTS_MIN),
    sw("major-faults", &[], Software::PAGE_FAULTS_MAJ),
    sw("context-switches", &["cs"], Software::CONTEXT_SWITCHES),
    sw("cpu-migrations", &["migrations"], Software::CPU_MIGRATIONS),
];

/// Resolve a perf name or alias. Matching is case-sensitive.
#[must_use]
pub fn lookup(name: &str) -> Option<EventCode> {
    CATALOG
        .iter()
        .position(|entry| entry.matches(name))
        .and_then(|index| u32::try_from(index).ok())
        .map(EventCode)
}

/// Catalog entry for a code returned by [`lookup`]
#[must_use]
pub fn entry(code: EventCode) -> Option<&'static CatalogEntry> {
    CATALOG.get(usize::try_from(code.0).ok()?)
}
