use super::Serializer;

impl Serializer<'_> {
    /// Quotes an identifier, doubling any embedded quote character.
    pub fn quote_ident(&self, ident: &str) -> String {
        let quote = self.capability.identifier_quote;
        let mut ret = String::with_capacity(ident.len() + 2);
        ret.push(quote);
        for ch in ident.chars() {
            if ch == quote {
                ret.push(quote);
            }
            ret.push(ch);
        }
        ret.push(quote);
        ret
    }
}
