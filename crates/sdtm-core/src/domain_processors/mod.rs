//! Domain-specific normalization rules.
//!
//! Each processor is a fixed sequence of idempotent mutation steps built
//! from [`crate::transforms`]. Findings domains share most of their rules
//! through `findings`.
//!
//! | Domain | Key operations |
//! |--------|----------------|
//! | AE | Outcome/severity lookup tables, date pair, study days |
//! | CM | Decoded term fill, dose numerics, date pair |
//! | DA | Findings rules, accountability results |
//! | DM | Defaults, reference date ordering, unassigned arms |
//! | DS | Category default, decoded term fill |
//! | EX | Dose numerics, date pair, study days |
//! | IE | Findings rules, Y/N results |
//! | LB | Findings rules, reference range numerics |
//! | MH | Decoded term fill, occurrence flags |
//! | PE | Findings rules, normal/abnormal results |
//! | PR | Decoded term fill, durations |
//! | QS | Findings rules |
//! | SE | Element dates, study days |
//! | TA | Arm and element codes |
//! | TE | Element codes, planned durations |
//! | TS | Parameter codes, TSSEQ per parameter |
//! | VS | Findings rules, position, elapsed time |

mod ae;
mod cm;
mod common;
mod da;
mod default;
mod dm;
mod ds;
mod ex;
mod findings;
mod ie;
mod lb;
mod mh;
mod pe;
mod pr;
mod processor_trait;
mod qs;
mod se;
mod ta;
mod te;
mod ts;
mod vs;

pub(crate) use common::drop_placeholder_rows;
pub use processor_trait::{DefaultProcessor, DomainProcessor, ProcessorRegistry, default_registry};

fn build_default_registry() -> ProcessorRegistry {
    let mut registry = ProcessorRegistry::new(Box::new(DefaultProcessor));
    registry.register(Box::new(ae::AeProcessor));
    registry.register(Box::new(cm::CmProcessor));
    registry.register(Box::new(da::DaProcessor));
    registry.register(Box::new(dm::DmProcessor));
    registry.register(Box::new(ds::DsProcessor));
    registry.register(Box::new(ex::ExProcessor));
    registry.register(Box::new(ie::IeProcessor));
    registry.register(Box::new(lb::LbProcessor));
    registry.register(Box::new(mh::MhProcessor));
    registry.register(Box::new(pe::PeProcessor));
    registry.register(Box::new(pr::PrProcessor));
    registry.register(Box::new(qs::QsProcessor));
    registry.register(Box::new(se::SeProcessor));
    registry.register(Box::new(ta::TaProcessor));
    registry.register(Box::new(te::TeProcessor));
    registry.register(Box::new(ts::TsProcessor));
    registry.register(Box::new(vs::VsProcessor));
    registry
}
