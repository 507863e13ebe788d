//! Foreign content (SVG/MathML) dispatch and name adjustment tables.

use super::{Html5TreeBuilder, ProcessResult, Tag, TreeSink};
use crate::html5::shared::{Attribute, Namespace, ParseErrorCode, Token};

/// Lower-cased SVG element names mapped to their camel-cased form.
const SVG_TAG_ADJUSTMENTS: &[(&str, &str)] = &[
    ("altglyph", "altGlyph"),
    ("altglyphdef", "altGlyphDef"),
    ("altglyphitem", "altGlyphItem"),
    ("animatecolor", "animateColor"),
    ("animatemotion", "animateMotion"),
    ("animatetransform", "animateTransform"),
    ("clippath", "clipPath"),
    ("feblend", "feBlend"),
    ("fecolormatrix", "feColorMatrix"),
    ("fecomponenttransfer", "feComponentTransfer"),
    ("fecomposite", "feComposite"),
    ("feconvolvematrix", "feConvolveMatrix"),
    ("fediffuselighting", "feDiffuseLighting"),
    ("fedisplacementmap", "feDisplacementMap"),
    ("fedistantlight", "feDistantLight"),
    ("feflood", "feFlood"),
    ("fefunca", "feFuncA"),
    ("fefuncb", "feFuncB"),
    ("fefuncg", "feFuncG"),
    ("fefuncr", "feFuncR"),
    ("fegaussianblur", "feGaussianBlur"),
    ("feimage", "feImage"),
    ("femerge", "feMerge"),
    ("femergenode", "feMergeNode"),
    ("femorphology", "feMorphology"),
    ("feoffset", "feOffset"),
    ("fepointlight", "fePointLight"),
    ("fespecularlighting", "feSpecularLighting"),
    ("fespotlight", "feSpotLight"),
    ("fetile", "feTile"),
    ("feturbulence", "feTurbulence"),
    ("foreignobject", "foreignObject"),
    ("glyphref", "glyphRef"),
    ("lineargradient", "linearGradient"),
    ("radialgradient", "radialGradient"),
    ("textpath", "textPath"),
];

const SVG_ATTRIBUTE_ADJUSTMENTS: &[(&str, &str)] = &[
    ("attributename", "attributeName"),
    ("attributetype", "attributeType"),
    ("basefrequency", "baseFrequency"),
    ("baseprofile", "baseProfile"),
    ("calcmode", "calcMode"),
    ("clippathunits", "clipPathUnits"),
    ("contentscripttype", "contentScriptType"),
    ("contentstyletype", "contentStyleType"),
    ("diffuseconstant", "diffuseConstant"),
    ("edgemode", "edgeMode"),
    ("externalresourcesrequired", "externalResourcesRequired"),
    ("filterres", "filterRes"),
    ("filterunits", "filterUnits"),
    ("glyphref", "glyphRef"),
    ("gradienttransform", "gradientTransform"),
    ("gradientunits", "gradientUnits"),
    ("kernelmatrix", "kernelMatrix"),
    ("kernelunitlength", "kernelUnitLength"),
    ("keypoints", "keyPoints"),
    ("keysplines", "keySplines"),
    ("keytimes", "keyTimes"),
    ("lengthadjust", "lengthAdjust"),
    ("limitingconeangle", "limitingConeAngle"),
    ("markerheight", "markerHeight"),
    ("markerunits", "markerUnits"),
    ("markerwidth", "markerWidth"),
    ("maskcontentunits", "maskContentUnits"),
    ("maskunits", "maskUnits"),
    ("numoctaves", "numOctaves"),
    ("pathlength", "pathLength"),
    ("patterncontentunits", "patternContentUnits"),
    ("patterntransform", "patternTransform"),
    ("patternunits", "patternUnits"),
    ("pointsatx", "pointsAtX"),
    ("pointsaty", "pointsAtY"),
    ("pointsatz", "pointsAtZ"),
    ("preservealpha", "preserveAlpha"),
    ("preserveaspectratio", "preserveAspectRatio"),
    ("primitiveunits", "primitiveUnits"),
    ("refx", "refX"),
    ("refy", "refY"),
    ("repeatcount", "repeatCount"),
    ("repeatdur", "repeatDur"),
    ("requiredextensions", "requiredExtensions"),
    ("requiredfeatures", "requiredFeatures"),
    ("specularconstant", "specularConstant"),
    ("specularexponent", "specularExponent"),
    ("spreadmethod", "spreadMethod"),
    ("startoffset", "startOffset"),
    ("stddeviation", "stdDeviation"),
    ("stitchtiles", "stitchTiles"),
    ("surfacescale", "surfaceScale"),
    ("systemlanguage", "systemLanguage"),
    ("tablevalues", "tableValues"),
    ("targetx", "targetX"),
    ("targety", "targetY"),
    ("textlength", "textLength"),
    ("viewbox", "viewBox"),
    ("viewtarget", "viewTarget"),
    ("xchannelselector", "xChannelSelector"),
    ("ychannelselector", "yChannelSelector"),
    ("zoomandpan", "zoomAndPan"),
];

/// `(qualified name, prefix, local name, namespace)`.
const FOREIGN_ATTRIBUTE_ADJUSTMENTS: &[(&str, Option<&str>, &str, Namespace)] = &[
    ("xlink:actuate", Some("xlink"), "actuate", Namespace::XLink),
    ("xlink:arcrole", Some("xlink"), "arcrole", Namespace::XLink),
    ("xlink:href", Some("xlink"), "href", Namespace::XLink),
    ("xlink:role", Some("xlink"), "role", Namespace::XLink),
    ("xlink:show", Some("xlink"), "show", Namespace::XLink),
    ("xlink:title", Some("xlink"), "title", Namespace::XLink),
    ("xlink:type", Some("xlink"), "type", Namespace::XLink),
    ("xml:base", Some("xml"), "base", Namespace::Xml),
    ("xml:lang", Some("xml"), "lang", Namespace::Xml),
    ("xml:space", Some("xml"), "space", Namespace::Xml),
    ("xmlns", None, "xmlns", Namespace::Xmlns),
    ("xmlns:xlink", Some("xmlns"), "xlink", Namespace::Xmlns),
];

/// HTML start tags that break out of foreign content.
const BREAKOUT_TAGS: &[&str] = &[
    "a",
    "b",
    "big",
    "blockquote",
    "body",
    "br",
    "center",
    "code",
    "dd",
    "div",
    "dl",
    "dt",
    "em",
    "embed",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "hr",
    "i",
    "img",
    "li",
    "listing",
    "menu",
    "meta",
    "nobr",
    "ol",
    "p",
    "pre",
    "ruby",
    "s",
    "small",
    "span",
    "strike",
    "strong",
    "sub",
    "sup",
    "table",
    "tt",
    "u",
    "ul",
    "var",
];

fn lookup<'a>(table: &[(&str, &'a str)], name: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(lower, _)| *lower == name)
        .map(|(_, adjusted)| *adjusted)
}

/// Camel-cases an SVG element name; unknown names pass through.
pub(crate) fn adjust_svg_tag_name(name: &str) -> &str {
    lookup(SVG_TAG_ADJUSTMENTS, name).unwrap_or(name)
}

pub(crate) fn adjust_svg_attributes(attrs: &mut [Attribute]) {
    for attr in attrs {
        if let Some(adjusted) = lookup(SVG_ATTRIBUTE_ADJUSTMENTS, &attr.name) {
            attr.name = adjusted.to_string();
        }
    }
}

pub(crate) fn adjust_mathml_attributes(attrs: &mut [Attribute]) {
    for attr in attrs {
        if attr.name == "definitionurl" {
            attr.name = "definitionURL".to_string();
        }
    }
}

/// Splits `xlink:`/`xml:`/`xmlns` attributes into prefix, local name and
/// namespace.
pub(crate) fn adjust_foreign_attributes(attrs: &mut [Attribute]) {
    for attr in attrs {
        let adjustment = FOREIGN_ATTRIBUTE_ADJUSTMENTS
            .iter()
            .find(|(qualified, ..)| *qualified == attr.name);
        if let Some((_, prefix, local_name, namespace)) = adjustment {
            attr.prefix = prefix.map(str::to_string);
            attr.name = (*local_name).to_string();
            attr.namespace = Some(*namespace);
        }
    }
}

fn is_breakout_tag(tag: &Tag) -> bool {
    BREAKOUT_TAGS.contains(&tag.name.as_str())
        || (tag.name == "font"
            && tag
                .attrs
                .iter()
                .any(|attr| matches!(attr.name.as_str(), "color" | "face" | "size")))
}

impl<S: TreeSink> Html5TreeBuilder<S> {
    /// Whether `token` goes through the foreign-content rules instead of the
    /// current insertion mode.
    pub(super) fn uses_foreign_content_rules(&self, token: &Token) -> bool {
        let Some(current) = self.open_elements.top() else {
            return false;
        };
        if !current.is_foreign() {
            return false;
        }
        match token {
            Token::Eof => false,
            Token::StartTag { name, .. }
                if current.is_mathml_text_integration_point()
                    && name != "mglyph"
                    && name != "malignmark" =>
            {
                false
            }
            Token::Text { .. } if current.is_mathml_text_integration_point() => false,
            Token::StartTag { name, .. }
                if current.namespace() == Namespace::MathMl
                    && current.local_name() == "annotation-xml"
                    && name == "svg" =>
            {
                false
            }
            Token::StartTag { .. } | Token::Text { .. } if current.is_html_integration_point() => {
                false
            }
            _ => true,
        }
    }

    pub(super) fn foreign_content(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Text { text } => {
                let text = if memchr::memchr(0, text.as_bytes()).is_some() {
                    self.error(ParseErrorCode::InvalidCodepoint);
                    text.replace('\0', "\u{FFFD}")
                } else {
                    text
                };
                if self.frameset_ok && !crate::html5::shared::is_all_whitespace(&text) {
                    self.frameset_ok = false;
                }
                self.insert_text(&text);
                ProcessResult::Done
            }
            Token::Comment { text } => {
                self.insert_comment(&text);
                ProcessResult::Done
            }
            Token::Doctype { .. } => {
                self.error(ParseErrorCode::UnexpectedDoctype);
                ProcessResult::Done
            }
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => self.foreign_start_tag(Tag {
                name,
                attrs,
                self_closing,
            }),
            Token::EndTag { name } => self.foreign_end_tag(name),
            // EOF is always handled by the current insertion mode.
            Token::Eof => ProcessResult::ReprocessIn(self.mode, Token::Eof),
        }
    }

    fn foreign_start_tag(&mut self, mut tag: Tag) -> ProcessResult {
        if is_breakout_tag(&tag) {
            self.error_named(ParseErrorCode::UnexpectedHtmlElementInForeignContent, &tag.name);
            while self.current().is_foreign()
                && !self.current().is_mathml_text_integration_point()
                && !self.current().is_html_integration_point()
            {
                self.open_elements.pop();
            }
            return ProcessResult::ReprocessIn(self.mode, tag.into_token());
        }

        let namespace = self.current().namespace();
        match namespace {
            Namespace::MathMl => adjust_mathml_attributes(&mut tag.attrs),
            Namespace::Svg => {
                let adjusted = adjust_svg_tag_name(&tag.name);
                if adjusted != tag.name {
                    tag.name = adjusted.to_string();
                }
                adjust_svg_attributes(&mut tag.attrs);
            }
            _ => {}
        }
        adjust_foreign_attributes(&mut tag.attrs);
        self.insert_foreign_element(namespace, &tag.name, tag.attrs, tag.self_closing);
        ProcessResult::Done
    }

    fn foreign_end_tag(&mut self, name: String) -> ProcessResult {
        let mut index = self.open_elements.len() - 1;
        let mut node = self.current().clone();
        if !node.local_name().eq_ignore_ascii_case(&name) {
            self.error_named(ParseErrorCode::UnexpectedEndTag, &name);
        }
        loop {
            if index == 0 {
                return ProcessResult::Done;
            }
            if node.local_name().eq_ignore_ascii_case(&name) {
                self.open_elements
                    .remove_open_elements_until(|popped| popped.id() == node.id());
                return ProcessResult::Done;
            }
            index -= 1;
            let Some(next) = self.open_elements.item(index) else {
                return ProcessResult::Done;
            };
            node = next.clone();
            if !node.is_foreign() {
                return ProcessResult::ReprocessIn(self.mode, Token::EndTag { name });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{adjust_foreign_attributes, adjust_svg_attributes, adjust_svg_tag_name};
    use crate::html5::shared::{Attribute, Namespace};

    #[test]
    fn svg_tag_names_are_camel_cased() {
        assert_eq!(adjust_svg_tag_name("foreignobject"), "foreignObject");
        assert_eq!(adjust_svg_tag_name("lineargradient"), "linearGradient");
        assert_eq!(adjust_svg_tag_name("circle"), "circle");
    }

    #[test]
    fn foreign_attributes_gain_prefix_and_namespace() {
        let mut attrs = vec![
            Attribute::new("xlink:href", "#a"),
            Attribute::new("xmlns", "http://www.w3.org/2000/svg"),
            Attribute::new("viewbox", "0 0 1 1"),
        ];
        adjust_svg_attributes(&mut attrs);
        adjust_foreign_attributes(&mut attrs);
        assert_eq!(attrs[0].name, "href");
        assert_eq!(attrs[0].prefix.as_deref(), Some("xlink"));
        assert_eq!(attrs[0].namespace, Some(Namespace::XLink));
        assert_eq!(attrs[1].prefix, None);
        assert_eq!(attrs[1].namespace, Some(Namespace::Xmlns));
        assert_eq!(attrs[2].name, "viewBox");
        assert_eq!(attrs[2].namespace, None);
    }
}
