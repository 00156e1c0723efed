//! Form state → single-row model input.

use crate::form::FormState;
use crate::schema::InputRecord;

/// Pack the current control values into one [`InputRecord`].
///
/// The form has already clamped and rounded every value, so this cannot fail;
/// integer columns are read back with a plain cast.
pub fn assemble(form: &FormState) -> InputRecord {
    let [magnitude, cdi, mmi, sig, nst, dmin, gap, depth, latitude, longitude, year, month] =
        *form.values();
    InputRecord {
        magnitude,
        cdi: cdi as u32,
        mmi: mmi as u32,
        sig: sig as u32,
        nst: nst as u32,
        dmin,
        gap,
        depth,
        latitude,
        longitude,
        year: year as u32,
        month: month as u32,
    }
}
