//! Fixed package parts: one master, one blank layout, one theme.

pub(super) const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(super) const NS_MAIN: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

pub(super) const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub(super) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(super) const REL_CORE_PROPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub(super) const REL_EXTENDED_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub(super) const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub(super) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(super) const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(super) const REL_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub(super) const REL_PRES_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
pub(super) const REL_VIEW_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";
pub(super) const REL_TABLE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";

pub(super) const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
pub(super) const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub(super) const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
pub(super) const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
pub(super) const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
pub(super) const CT_PRES_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
pub(super) const CT_VIEW_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";
pub(super) const CT_TABLE_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";
pub(super) const CT_CORE_PROPS: &str = "application/vnd.openxmlformats-package.core-properties+xml";
pub(super) const CT_EXTENDED_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";

pub(super) const EMPTY_GROUP_PROPS: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

pub(super) fn slide_master() -> String {
    format!(
        concat!(
            "{decl}<p:sldMaster {ns}>",
            "<p:cSld><p:bg><p:bgRef idx=\"1001\"><a:schemeClr val=\"bg1\"/></p:bgRef></p:bg>",
            "<p:spTree>{group}</p:spTree></p:cSld>",
            "<p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" accent2=\"accent2\" ",
            "accent3=\"accent3\" accent4=\"accent4\" accent5=\"accent5\" accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>",
            "<p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>",
            "<p:txStyles>",
            "<p:titleStyle><a:lvl1pPr><a:defRPr sz=\"4400\"/></a:lvl1pPr></p:titleStyle>",
            "<p:bodyStyle><a:lvl1pPr><a:defRPr sz=\"2800\"/></a:lvl1pPr></p:bodyStyle>",
            "<p:otherStyle><a:lvl1pPr><a:defRPr sz=\"1800\"/></a:lvl1pPr></p:otherStyle>",
            "</p:txStyles></p:sldMaster>"
        ),
        decl = XML_DECL,
        ns = NS_MAIN,
        group = EMPTY_GROUP_PROPS,
    )
}

pub(super) fn blank_layout() -> String {
    format!(
        concat!(
            "{decl}<p:sldLayout {ns} type=\"blank\" preserve=\"1\">",
            "<p:cSld name=\"Blank\"><p:spTree>{group}</p:spTree></p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"
        ),
        decl = XML_DECL,
        ns = NS_MAIN,
        group = EMPTY_GROUP_PROPS,
    )
}

pub(super) fn pres_props() -> String {
    format!("{XML_DECL}<p:presentationPr {NS_MAIN}/>")
}

pub(super) fn view_props() -> String {
    format!(
        concat!(
            "{decl}<p:viewPr {ns}>",
            "<p:normalViewPr><p:restoredLeft sz=\"15620\"/><p:restoredTop sz=\"94660\"/></p:normalViewPr>",
            "<p:gridSpacing cx=\"76200\" cy=\"76200\"/></p:viewPr>"
        ),
        decl = XML_DECL,
        ns = NS_MAIN,
    )
}

pub(super) fn table_styles() -> String {
    format!(
        "{XML_DECL}<a:tblStyleLst xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" def=\"{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}\"/>"
    )
}

pub(super) fn theme(font_family: &str) -> String {
    let font = super::escape_xml(font_family);
    format!(
        concat!(
            "{decl}<a:theme xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" name=\"Organogram\">",
            "<a:themeElements>",
            "<a:clrScheme name=\"Office\">",
            "<a:dk1><a:sysClr val=\"windowText\" lastClr=\"000000\"/></a:dk1>",
            "<a:lt1><a:sysClr val=\"window\" lastClr=\"FFFFFF\"/></a:lt1>",
            "<a:dk2><a:srgbClr val=\"0E2841\"/></a:dk2>",
            "<a:lt2><a:srgbClr val=\"E8E8E8\"/></a:lt2>",
            "<a:accent1><a:srgbClr val=\"156082\"/></a:accent1>",
            "<a:accent2><a:srgbClr val=\"E97132\"/></a:accent2>",
            "<a:accent3><a:srgbClr val=\"196B24\"/></a:accent3>",
            "<a:accent4><a:srgbClr val=\"0F9ED5\"/></a:accent4>",
            "<a:accent5><a:srgbClr val=\"A02B93\"/></a:accent5>",
            "<a:accent6><a:srgbClr val=\"4EA72E\"/></a:accent6>",
            "<a:hlink><a:srgbClr val=\"467886\"/></a:hlink>",
            "<a:folHlink><a:srgbClr val=\"96607D\"/></a:folHlink>",
            "</a:clrScheme>",
            "<a:fontScheme name=\"Organogram\">",
            "<a:majorFont><a:latin typeface=\"{font}\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:majorFont>",
            "<a:minorFont><a:latin typeface=\"{font}\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:minorFont>",
            "</a:fontScheme>",
            "<a:fmtScheme name=\"Office\">",
            "<a:fillStyleLst>",
            "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>",
            "<a:solidFill><a:schemeClr val=\"phClr\"><a:tint val=\"50000\"/></a:schemeClr></a:solidFill>",
            "<a:solidFill><a:schemeClr val=\"phClr\"><a:shade val=\"80000\"/></a:schemeClr></a:solidFill>",
            "</a:fillStyleLst>",
            "<a:lnStyleLst>",
            "<a:ln w=\"12700\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>",
            "<a:ln w=\"19050\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>",
            "<a:ln w=\"25400\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>",
            "</a:lnStyleLst>",
            "<a:effectStyleLst>",
            "<a:effectStyle><a:effectLst/></a:effectStyle>",
            "<a:effectStyle><a:effectLst/></a:effectStyle>",
            "<a:effectStyle><a:effectLst/></a:effectStyle>",
            "</a:effectStyleLst>",
            "<a:bgFillStyleLst>",
            "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>",
            "<a:solidFill><a:schemeClr val=\"phClr\"><a:tint val=\"95000\"/></a:schemeClr></a:solidFill>",
            "<a:solidFill><a:schemeClr val=\"phClr\"><a:shade val=\"90000\"/></a:schemeClr></a:solidFill>",
            "</a:bgFillStyleLst>",
            "</a:fmtScheme>",
            "</a:themeElements>",
            "<a:objectDefaults/><a:extraClrSchemeLst/>",
            "</a:theme>"
        ),
        decl = XML_DECL,
        font = font,
    )
}
