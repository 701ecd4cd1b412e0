// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Filter quality policy.

Caps on the filter and mipmap quality any sampler may use.  A cap only ever downgrades:
the effective mode is `min(requested, cap)`, computed whenever a sampler's state is read.
The requested mode stored on each sampler is left alone, so raising the cap again restores it.

One policy is shared by every sampler built from the same
[SamplingContext](crate::sampler::engine::SamplingContext).
*/

use std::sync::atomic::{AtomicU32, Ordering};

use crate::sampler::state::{FilterType, MipmapType};

#[derive(Debug)]
pub struct QualityPolicy {
    filter: AtomicU32,
    mipmap: AtomicU32,
}

impl QualityPolicy {
    pub fn new(filter_quality: FilterType, mipmap_quality: MipmapType) -> Self {
        Self {
            filter: AtomicU32::new(filter_quality.index()),
            mipmap: AtomicU32::new(mipmap_quality.index()),
        }
    }

    /// Sets the highest filter any sampler may use.
    pub fn set_filter_quality(&self, maximum: FilterType) {
        logwise::info_sync!("filter quality cap set to {maximum}", maximum = logwise::privacy::LogIt(&maximum));
        self.filter.store(maximum.index(), Ordering::Relaxed);
    }

    /// Sets the highest mipmap mode any sampler may use.
    pub fn set_mipmap_quality(&self, maximum: MipmapType) {
        logwise::info_sync!("mipmap quality cap set to {maximum}", maximum = logwise::privacy::LogIt(&maximum));
        self.mipmap.store(maximum.index(), Ordering::Relaxed);
    }

    pub fn filter_quality(&self) -> FilterType {
        FilterType::from_index(self.filter.load(Ordering::Relaxed)).unwrap_or(FilterType::LAST)
    }

    pub fn mipmap_quality(&self) -> MipmapType {
        MipmapType::from_index(self.mipmap.load(Ordering::Relaxed)).unwrap_or(MipmapType::LAST)
    }

    #[inline] pub fn effective_filter(&self, requested: FilterType) -> FilterType {
        requested.min(self.filter_quality())
    }

    #[inline] pub fn effective_mipmap(&self, requested: MipmapType) -> MipmapType {
        requested.min(self.mipmap_quality())
    }
}

impl Default for QualityPolicy {
    /// No caps.
    fn default() -> Self {
        Self::new(FilterType::LAST, MipmapType::LAST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downgrade_only() {
        let policy = QualityPolicy::default();
        assert_eq!(policy.effective_filter(FilterType::Anisotropic), FilterType::Anisotropic);
        policy.set_filter_quality(FilterType::Linear);
        assert_eq!(policy.effective_filter(FilterType::Anisotropic), FilterType::Linear);
        assert_eq!(policy.effective_filter(FilterType::Point), FilterType::Point);
        policy.set_mipmap_quality(MipmapType::Point);
        assert_eq!(policy.effective_mipmap(MipmapType::Linear), MipmapType::Point);
        assert_eq!(policy.effective_mipmap(MipmapType::None), MipmapType::None);
        policy.set_filter_quality(FilterType::Anisotropic);
        assert_eq!(policy.effective_filter(FilterType::Anisotropic), FilterType::Anisotropic);
    }
}
