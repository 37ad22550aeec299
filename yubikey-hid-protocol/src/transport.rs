use crate::error::TransportError;
use crate::report::Report;

/// Feature report channel to an opened and claimed device.
///
/// Implementations must fail rather than silently transfer a partial report. Only a single
/// operation may be in flight on a channel at any time.
pub trait Transport {
    fn write_feature_report(&mut self, report: &Report) -> Result<(), TransportError>;
    fn read_feature_report(&mut self) -> Result<Report, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write_feature_report(&mut self, report: &Report) -> Result<(), TransportError> {
        (**self).write_feature_report(report)
    }

    fn read_feature_report(&mut self) -> Result<Report, TransportError> {
        (**self).read_feature_report()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_feature_report(&mut self, report: &Report) -> Result<(), TransportError> {
        Box::as_mut(self).write_feature_report(report)
    }

    fn read_feature_report(&mut self) -> Result<Report, TransportError> {
        Box::as_mut(self).read_feature_report()
    }
}
