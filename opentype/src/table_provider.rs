//! a trait for things that can serve font tables

use types::Tag;

use crate::{tables, FontData, FontRead, FontReadWithArgs, ReadError};

/// An interface for accessing tables from a font (or font-like object)
pub trait TableProvider<'a> {
    fn data_for_tag(&self, tag: Tag) -> Option<FontData<'a>>;

    fn expect_data_for_tag(&self, tag: Tag) -> Result<FontData<'a>, ReadError> {
        self.data_for_tag(tag).ok_or(ReadError::TableIsMissing(tag))
    }

    /// Read the table with the given tag, if present.
    ///
    /// Returns `None` if the table is missing and `Some(Err(..))` if it is
    /// present but fails to parse.
    fn optional<T: FontRead<'a>>(&self, tag: Tag) -> Option<Result<T, ReadError>> {
        self.data_for_tag(tag).map(T::read)
    }

    fn head(&self) -> Result<tables::head::Head<'a>, ReadError> {
        self.expect_data_for_tag(tables::head::TAG)
            .and_then(FontRead::read)
    }

    fn maxp(&self) -> Result<tables::maxp::Maxp<'a>, ReadError> {
        self.expect_data_for_tag(tables::maxp::TAG)
            .and_then(FontRead::read)
    }

    fn name(&self) -> Result<tables::name::Name<'a>, ReadError> {
        self.expect_data_for_tag(tables::name::TAG)
            .and_then(FontRead::read)
    }

    fn hhea(&self) -> Result<tables::hvhea::HVhea<'a>, ReadError> {
        self.expect_data_for_tag(tables::hvhea::HHEA_TAG)
            .and_then(FontRead::read)
    }

    fn vhea(&self) -> Result<tables::hvhea::HVhea<'a>, ReadError> {
        self.expect_data_for_tag(tables::hvhea::VHEA_TAG)
            .and_then(FontRead::read)
    }

    fn hmtx(&self) -> Result<tables::hvmtx::HVmtx<'a>, ReadError> {
        let num_glyphs = self.maxp().map(|maxp| maxp.num_glyphs())?;
        let number_of_h_metrics = self.hhea().map(|hhea| hhea.number_of_long_metrics())?;
        self.expect_data_for_tag(tables::hvmtx::HMTX_TAG)
            .and_then(|data| {
                FontReadWithArgs::read_with_args(data, &(number_of_h_metrics, num_glyphs))
            })
    }

    fn vmtx(&self) -> Result<tables::hvmtx::HVmtx<'a>, ReadError> {
        let num_glyphs = self.maxp().map(|maxp| maxp.num_glyphs())?;
        let number_of_v_metrics = self.vhea().map(|vhea| vhea.number_of_long_metrics())?;
        self.expect_data_for_tag(tables::hvmtx::VMTX_TAG)
            .and_then(|data| {
                FontReadWithArgs::read_with_args(data, &(number_of_v_metrics, num_glyphs))
            })
    }

    fn os2(&self) -> Result<tables::os2::Os2<'a>, ReadError> {
        self.expect_data_for_tag(tables::os2::TAG)
            .and_then(FontRead::read)
    }

    fn post(&self) -> Result<tables::post::Post<'a>, ReadError> {
        self.expect_data_for_tag(tables::post::TAG)
            .and_then(FontRead::read)
    }

    fn cmap(&self) -> Result<tables::cmap::Cmap<'a>, ReadError> {
        self.expect_data_for_tag(tables::cmap::TAG)
            .and_then(FontRead::read)
    }

    /// is_long can be optionally provided, if known, otherwise we look it up in head.
    fn loca(&self, is_long: impl Into<Option<bool>>) -> Result<tables::loca::Loca<'a>, ReadError> {
        let is_long = match is_long.into() {
            Some(val) => val,
            None => self.head()?.index_to_loc_format() == 1,
        };
        self.expect_data_for_tag(tables::loca::TAG)
            .and_then(|data| FontReadWithArgs::read_with_args(data, &is_long))
    }

    fn glyf(&self) -> Result<tables::glyf::Glyf<'a>, ReadError> {
        self.expect_data_for_tag(tables::glyf::TAG)
            .and_then(FontRead::read)
    }

    fn cff(&self) -> Result<tables::cff::Cff<'a>, ReadError> {
        self.expect_data_for_tag(tables::cff::TAG)
            .and_then(FontRead::read)
    }

    fn cff2(&self) -> Result<tables::cff2::Cff2<'a>, ReadError> {
        self.expect_data_for_tag(tables::cff2::TAG)
            .and_then(FontRead::read)
    }

    fn kern(&self) -> Result<tables::kern::Kern<'a>, ReadError> {
        self.expect_data_for_tag(tables::kern::TAG)
            .and_then(FontRead::read)
    }

    fn kerx(&self) -> Result<tables::kerx::Kerx<'a>, ReadError> {
        self.expect_data_for_tag(tables::kerx::TAG)
            .and_then(FontRead::read)
    }

    fn morx(&self) -> Result<tables::morx::Morx<'a>, ReadError> {
        self.expect_data_for_tag(tables::morx::TAG)
            .and_then(FontRead::read)
    }

    fn trak(&self) -> Result<tables::trak::Trak<'a>, ReadError> {
        self.expect_data_for_tag(tables::trak::TAG)
            .and_then(FontRead::read)
    }

    fn feat(&self) -> Result<tables::feat::Feat<'a>, ReadError> {
        self.expect_data_for_tag(tables::feat::TAG)
            .and_then(FontRead::read)
    }

    fn ankr(&self) -> Result<tables::ankr::Ankr<'a>, ReadError> {
        self.expect_data_for_tag(tables::ankr::TAG)
            .and_then(FontRead::read)
    }

    fn colr(&self) -> Result<tables::colr::Colr<'a>, ReadError> {
        self.expect_data_for_tag(tables::colr::TAG)
            .and_then(FontRead::read)
    }

    fn cpal(&self) -> Result<tables::cpal::Cpal<'a>, ReadError> {
        self.expect_data_for_tag(tables::cpal::TAG)
            .and_then(FontRead::read)
    }

    fn cblc(&self) -> Result<tables::bitmap::Blc<'a>, ReadError> {
        self.expect_data_for_tag(tables::bitmap::CBLC_TAG)
            .and_then(FontRead::read)
    }

    fn cbdt(&self) -> Result<tables::bitmap::Bdt<'a>, ReadError> {
        self.expect_data_for_tag(tables::bitmap::CBDT_TAG)
            .and_then(FontRead::read)
    }

    fn eblc(&self) -> Result<tables::bitmap::Blc<'a>, ReadError> {
        self.expect_data_for_tag(tables::bitmap::EBLC_TAG)
            .and_then(FontRead::read)
    }

    fn ebdt(&self) -> Result<tables::bitmap::Bdt<'a>, ReadError> {
        self.expect_data_for_tag(tables::bitmap::EBDT_TAG)
            .and_then(FontRead::read)
    }

    fn sbix(&self) -> Result<tables::sbix::Sbix<'a>, ReadError> {
        let num_glyphs = self.maxp().map(|maxp| maxp.num_glyphs())?;
        self.expect_data_for_tag(tables::sbix::TAG)
            .and_then(|data| FontReadWithArgs::read_with_args(data, &num_glyphs))
    }

    fn svg(&self) -> Result<tables::svg::Svg<'a>, ReadError> {
        self.expect_data_for_tag(tables::svg::TAG)
            .and_then(FontRead::read)
    }

    fn vorg(&self) -> Result<tables::vorg::Vorg<'a>, ReadError> {
        self.expect_data_for_tag(tables::vorg::TAG)
            .and_then(FontRead::read)
    }

    fn fvar(&self) -> Result<tables::fvar::Fvar<'a>, ReadError> {
        self.expect_data_for_tag(tables::fvar::TAG)
            .and_then(FontRead::read)
    }

    fn avar(&self) -> Result<tables::avar::Avar<'a>, ReadError> {
        self.expect_data_for_tag(tables::avar::TAG)
            .and_then(FontRead::read)
    }

    fn gvar(&self) -> Result<tables::gvar::Gvar<'a>, ReadError> {
        self.expect_data_for_tag(tables::gvar::TAG)
            .and_then(FontRead::read)
    }

    fn hvar(&self) -> Result<tables::hvar::Hvar<'a>, ReadError> {
        self.expect_data_for_tag(tables::hvar::HVAR_TAG)
            .and_then(FontRead::read)
    }

    fn vvar(&self) -> Result<tables::hvar::Hvar<'a>, ReadError> {
        self.expect_data_for_tag(tables::hvar::VVAR_TAG)
            .and_then(FontRead::read)
    }

    fn mvar(&self) -> Result<tables::mvar::Mvar<'a>, ReadError> {
        self.expect_data_for_tag(tables::mvar::TAG)
            .and_then(FontRead::read)
    }

    fn stat(&self) -> Result<tables::stat::Stat<'a>, ReadError> {
        self.expect_data_for_tag(tables::stat::TAG)
            .and_then(FontRead::read)
    }

    fn gdef(&self) -> Result<tables::gdef::Gdef<'a>, ReadError> {
        self.expect_data_for_tag(tables::gdef::TAG)
            .and_then(FontRead::read)
    }

    fn gsub(&self) -> Result<tables::gsub::Gsub<'a>, ReadError> {
        self.expect_data_for_tag(tables::gsub::TAG)
            .and_then(FontRead::read)
    }

    fn gpos(&self) -> Result<tables::gpos::Gpos<'a>, ReadError> {
        self.expect_data_for_tag(tables::gpos::TAG)
            .and_then(FontRead::read)
    }
}
