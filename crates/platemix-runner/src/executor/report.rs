use platemix_core::WellName;

/// Summary of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Mixtures assigned a well and fully dispensed.
    pub mixtures_placed: usize,

    /// Transfers issued across all mixtures.
    pub transfers: usize,

    /// Transfers per instrument, indexed like the executor's pipettes.
    pub transfers_by_instrument: Vec<usize>,

    /// Well of the last placed mixture.
    pub last_well: Option<WellName>,
}

impl RunReport {
    pub(crate) fn new(instrument_count: usize) -> Self {
        RunReport {
            transfers_by_instrument: vec![0; instrument_count],
            ..Self::default()
        }
    }

    pub(crate) fn record_transfer(&mut self, instrument: usize) {
        self.transfers += 1;
        self.transfers_by_instrument[instrument] += 1;
    }

    pub(crate) fn record_mixture(&mut self, well: WellName) {
        self.mixtures_placed += 1;
        self.last_well = Some(well);
    }
}
